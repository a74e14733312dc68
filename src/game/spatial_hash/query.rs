use bevy::prelude::*;
use super::{CellKey, SpatialMap, NEIGHBORHOOD};

impl<T> SpatialMap<T> {
    /// Keys of the 3x3 block centered on `key`, in row order.
    pub fn neighborhood(key: CellKey) -> impl Iterator<Item = CellKey> {
        NEIGHBORHOOD.into_iter().map(move |offset| key + offset)
    }

    /// Visit every item in the cell containing `position` and its eight
    /// neighbours. Takes a shared lock on one cell at a time.
    pub fn for_each_near(&self, position: Vec2, mut f: impl FnMut(&T)) {
        for key in Self::neighborhood(self.key_of(position)) {
            if let Some(bucket) = self.read_cell(key) {
                bucket.iter().for_each(&mut f);
            }
        }
    }

    /// Items in the cell containing `position` and its eight neighbours.
    ///
    /// Populates `out` instead of allocating a new Vec. Clears `out` first.
    /// Results are candidates only; callers filter by actual distance.
    pub fn query_cell_and_neighbors(&self, position: Vec2, out: &mut Vec<T>)
    where
        T: Clone,
    {
        out.clear();
        self.for_each_near(position, |item| out.push(item.clone()));
    }
}
