use bevy::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod pool;
mod query;
#[cfg(test)]
mod tests;

pub use pool::BucketPool;

/// Integer grid coordinate of a cell.
pub type CellKey = IVec2;

/// The half of the 3x3 neighbourhood that a cell pairs against.
///
/// Every offset orders after `(0, 0)` under `(y, x)` ordering, so a worker that
/// holds its home cell only ever waits on cells ordered after it. Together with
/// the home cell this visits each pair of adjacent cells exactly once.
pub const FORWARD_NEIGHBORS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

/// Home cell plus its eight surrounding cells.
pub const NEIGHBORHOOD: [IVec2; 9] = [
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

/// Sparse uniform grid rebuilt from scratch every simulation step.
///
/// Items are bucketed by `floor(position / cell_size)`. Only occupied cells
/// exist; each owns a bucket behind its own lock so that a parallel pass can
/// write to disjoint cells while readers share the rest.
///
/// # Lifecycle
///
/// 1. [`clear`](Self::clear) returns every bucket to the [`BucketPool`].
/// 2. [`insert`](Self::insert) repopulates the map, pulling buckets back out
///    of the pool sized after last frame's occupancy of the same cell.
/// 3. The collision pass locks cells for writing; steering reads them.
///
/// After a few frames of warm-up, a stable population rebuilds the map without
/// allocating.
pub struct SpatialMap<T> {
    cell_size: f32,
    inv_cell_size: f32,
    index: FxHashMap<CellKey, usize>,
    keys: Vec<CellKey>,
    cells: Vec<RwLock<Vec<T>>>,
    len: usize,
    previous_sizes: FxHashMap<CellKey, usize>,
    pool: BucketPool<T>,
}

impl<T> SpatialMap<T> {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 {
            cell_size
        } else {
            warn!("[SPATIAL] Invalid cell size {}, falling back to 1.0", cell_size);
            1.0
        };

        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            index: FxHashMap::default(),
            keys: Vec::new(),
            cells: Vec::new(),
            len: 0,
            previous_sizes: FxHashMap::default(),
            pool: BucketPool::default(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Change the cell size. Empties the map, since every key changes.
    pub fn set_cell_size(&mut self, cell_size: f32) {
        if cell_size <= 0.0 || cell_size == self.cell_size {
            return;
        }
        self.clear();
        self.previous_sizes.clear();
        self.cell_size = cell_size;
        self.inv_cell_size = 1.0 / cell_size;
    }

    pub fn key_of(&self, position: Vec2) -> CellKey {
        (position * self.inv_cell_size).floor().as_ivec2()
    }

    /// World-space rectangle covered by a cell, as (min corner, size).
    pub fn cell_bounds(&self, key: CellKey) -> (Vec2, Vec2) {
        (key.as_vec2() * self.cell_size, Vec2::splat(self.cell_size))
    }

    /// Number of items inserted since the last clear.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn occupied_len(&self) -> usize {
        self.keys.len()
    }

    /// Occupied cells in first-insertion order.
    pub fn occupied_keys(&self) -> &[CellKey] {
        &self.keys
    }

    pub fn pool(&self) -> &BucketPool<T> {
        &self.pool
    }

    /// Return all buckets to the pool and forget every cell.
    pub fn clear(&mut self) {
        self.previous_sizes.clear();
        for (key, cell) in self.keys.drain(..).zip(self.cells.drain(..)) {
            let bucket = cell.into_inner().unwrap_or_else(PoisonError::into_inner);
            self.previous_sizes.insert(key, bucket.len());
            self.pool.release(bucket);
        }
        self.index.clear();
        self.len = 0;
    }

    pub fn insert(&mut self, position: Vec2, item: T) {
        let key = self.key_of(position);
        let slot = match self.index.entry(key) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let hint = self.previous_sizes.get(&key).copied().unwrap_or(0);
                self.cells.push(RwLock::new(self.pool.acquire(hint)));
                self.keys.push(key);
                *entry.insert(self.cells.len() - 1)
            }
        };

        self.cells[slot].get_mut().unwrap_or_else(PoisonError::into_inner).push(item);
        self.len += 1;
    }

    /// Dense slot of an occupied cell.
    pub fn slot_of(&self, key: CellKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    pub fn cell_len(&self, key: CellKey) -> usize {
        self.read_cell(key).map_or(0, |bucket| bucket.len())
    }

    /// Shared access to one cell's bucket.
    pub fn read_cell(&self, key: CellKey) -> Option<RwLockReadGuard<'_, Vec<T>>> {
        let slot = self.slot_of(key)?;
        Some(self.cells[slot].read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Exclusive access to the bucket in `slot`. Blocks while another worker
    /// holds it.
    pub fn lock_slot(&self, slot: usize) -> RwLockWriteGuard<'_, Vec<T>> {
        self.cells[slot].write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Visit every item without locking; requires exclusive access to the map.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(CellKey, &mut T)) {
        for (key, cell) in self.keys.iter().zip(self.cells.iter_mut()) {
            let bucket = cell.get_mut().unwrap_or_else(PoisonError::into_inner);
            for item in bucket.iter_mut() {
                f(*key, item);
            }
        }
    }
}

impl<T> Default for SpatialMap<T> {
    fn default() -> Self {
        Self::new(64.0)
    }
}
