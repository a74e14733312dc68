use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use std::collections::VecDeque;

use crate::game::geometry::ColliderShape;

#[cfg(test)]
#[path = "flow_field_tests.rs"]
mod tests;

/// Cost of a blocked cell. Never entered by either pass.
pub const IMPASSABLE: u8 = u8::MAX;

/// Integration value of a cell the integration pass never reached.
pub const UNREACHED: u32 = u32::MAX;

/// Orthogonal steps used by the integration pass.
const ORTHOGONAL: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
];

/// Steps used by the flow pass. Orthogonal first so ties favour straight moves.
const ALL_DIRECTIONS: [IVec2; 8] = [
    IVec2::new(0, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
    IVec2::new(-1, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(1, 1),
];

/// Square steering field centered on a moving origin (the pursued target).
///
/// Cells are addressed by signed coordinates in `-side_width..=side_width` on
/// both axes; cell `(0, 0)` is centered on the origin.
///
/// # Algorithm
///
/// 1. **Costs:** [`reset`](Self::reset), then [`block_cell`](Self::block_cell)
///    for scenery and [`add_crowding`](Self::add_crowding) for agents.
/// 2. **Integration:** 4-way FIFO relaxation from the center, where stepping
///    into a cell costs `1 + cost`.
/// 3. **Flow:** 8-way breadth-first walk from the center; each visited cell
///    points at its lowest-integration neighbour.
///
/// All buffers are allocated once in [`new`](Self::new) and reused every frame.
#[derive(Clone, Debug)]
pub struct FlowField {
    cell_size: f32,
    side_width: i32,
    origin: Vec2,
    costs: Vec<u8>,
    integration: Vec<u32>,
    flow: Vec<Vec2>,
    visited: FixedBitSet,
    queue: VecDeque<IVec2>,
}

impl FlowField {
    pub fn new(cell_size: f32, side_width: i32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let side_width = side_width.max(0);
        let side = (2 * side_width + 1) as usize;
        let len = side * side;

        Self {
            cell_size,
            side_width,
            origin: Vec2::ZERO,
            costs: vec![0; len],
            integration: vec![UNREACHED; len],
            flow: vec![Vec2::ZERO; len],
            visited: FixedBitSet::with_capacity(len),
            queue: VecDeque::with_capacity(len),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn side_width(&self) -> i32 {
        self.side_width
    }

    /// Cells per row.
    pub fn side(&self) -> usize {
        (2 * self.side_width + 1) as usize
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x.abs() <= self.side_width && cell.y.abs() <= self.side_width
    }

    /// Row-major index of an in-bounds cell.
    pub fn index_of(&self, cell: IVec2) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let w = self.side_width;
        Some(((cell.y + w) * (2 * w + 1) + cell.x + w) as usize)
    }

    /// Cell whose square contains `position`, if it lies inside the field.
    pub fn cell_at(&self, position: Vec2) -> Option<IVec2> {
        let local = (position - self.origin + Vec2::splat(self.cell_size * 0.5)) / self.cell_size;
        let cell = local.floor().as_ivec2();
        self.in_bounds(cell).then_some(cell)
    }

    pub fn cell_center(&self, cell: IVec2) -> Vec2 {
        self.origin + cell.as_vec2() * self.cell_size
    }

    pub fn cost(&self, cell: IVec2) -> Option<u8> {
        self.index_of(cell).map(|i| self.costs[i])
    }

    pub fn integration(&self, cell: IVec2) -> Option<u32> {
        self.index_of(cell).map(|i| self.integration[i])
    }

    pub fn flow(&self, cell: IVec2) -> Option<Vec2> {
        self.index_of(cell).map(|i| self.flow[i])
    }

    /// Steering direction at a world position, or `None` outside the field.
    /// Unit length, or zero at the center and at unreachable cells.
    pub fn direction_at(&self, position: Vec2) -> Option<Vec2> {
        self.cell_at(position).and_then(|cell| self.flow(cell))
    }

    pub fn is_blocked(&self, cell: IVec2) -> bool {
        self.cost(cell) == Some(IMPASSABLE)
    }

    // ========================================================================
    // Cost marking
    // ========================================================================

    /// Move the field and clear all costs.
    pub fn reset(&mut self, origin: Vec2) {
        self.origin = origin;
        self.costs.fill(0);
    }

    /// Mark a cell impassable. Returns false if it lies outside the field.
    pub fn block_cell(&mut self, cell: IVec2) -> bool {
        match self.index_of(cell) {
            Some(i) => {
                self.costs[i] = IMPASSABLE;
                true
            }
            None => false,
        }
    }

    /// Block every cell whose center lies inside `shape`, and always the cell
    /// containing the shape's own center.
    pub fn block_shape(&mut self, position: Vec2, shape: &ColliderShape) -> usize {
        let mut blocked = 0;
        if let Some(cell) = self.cell_at(position) {
            self.block_cell(cell);
            blocked += 1;
        }

        let extent = shape.extent();
        let min = ((position - extent - self.origin) / self.cell_size).floor().as_ivec2();
        let max = ((position + extent - self.origin) / self.cell_size).ceil().as_ivec2();
        let w = self.side_width;
        for y in min.y.max(-w)..=max.y.min(w) {
            for x in min.x.max(-w)..=max.x.min(w) {
                let cell = IVec2::new(x, y);
                if !self.is_blocked(cell) && shape.contains_point(position, self.cell_center(cell)) {
                    self.block_cell(cell);
                    blocked += 1;
                }
            }
        }
        blocked
    }

    /// Raise the cost of the cell at `position` by `weight`, stopping short of
    /// impassable. Blocked cells stay blocked.
    pub fn add_crowding(&mut self, position: Vec2, weight: u8) {
        let Some(i) = self.cell_at(position).and_then(|c| self.index_of(c)) else { return };
        let cost = self.costs[i];
        if cost != IMPASSABLE {
            self.costs[i] = cost.saturating_add(weight).min(IMPASSABLE - 1);
        }
    }

    // ========================================================================
    // Passes
    // ========================================================================

    /// Run the integration and flow passes over the current costs.
    pub fn regenerate(&mut self) {
        self.integrate();
        self.build_flow();
    }

    /// 4-way relaxation from the center cell.
    pub fn integrate(&mut self) {
        self.integration.fill(UNREACHED);
        let Some(center) = self.index_of(IVec2::ZERO) else { return };

        if self.costs[center] == IMPASSABLE {
            debug!("[FLOW] Center cell blocked at {:?}, treating it as open", self.origin);
            self.costs[center] = 0;
        }

        self.integration[center] = 0;
        self.queue.clear();
        self.queue.push_back(IVec2::ZERO);

        while let Some(cell) = self.queue.pop_front() {
            let Some(ci) = self.index_of(cell) else { continue };
            let current = self.integration[ci];

            for step in ORTHOGONAL {
                let next = cell + step;
                let Some(ni) = self.index_of(next) else { continue };
                let cost = self.costs[ni];
                if cost == IMPASSABLE {
                    continue;
                }

                let tentative = current.saturating_add(1 + cost as u32);
                if tentative < self.integration[ni] {
                    self.integration[ni] = tentative;
                    self.queue.push_back(next);
                }
            }
        }
    }

    /// 8-way walk from the center, pointing each reached cell at its cheapest
    /// neighbour. Cells the walk never reaches keep a zero vector.
    pub fn build_flow(&mut self) {
        self.flow.fill(Vec2::ZERO);
        self.visited.clear();
        self.queue.clear();

        let Some(center) = self.index_of(IVec2::ZERO) else { return };
        self.visited.insert(center);
        self.queue.push_back(IVec2::ZERO);

        while let Some(cell) = self.queue.pop_front() {
            let Some(ci) = self.index_of(cell) else { continue };

            if cell != IVec2::ZERO {
                self.flow[ci] = self.cheapest_step(cell).map_or(Vec2::ZERO, |step| step.as_vec2().normalize());
            }

            for step in ALL_DIRECTIONS {
                let next = cell + step;
                let Some(ni) = self.index_of(next) else { continue };
                if self.visited.contains(ni) || !self.walkable(cell, step) {
                    continue;
                }
                self.visited.insert(ni);
                self.queue.push_back(next);
            }
        }
    }

    /// First neighbour step (in `ALL_DIRECTIONS` order) with the strictly
    /// lowest integration value.
    fn cheapest_step(&self, cell: IVec2) -> Option<IVec2> {
        let mut best: Option<(u32, IVec2)> = None;
        for step in ALL_DIRECTIONS {
            if !self.walkable(cell, step) {
                continue;
            }
            let Some(value) = self.integration(cell + step) else { continue };
            if value == UNREACHED {
                continue;
            }
            if best.is_none_or(|(lowest, _)| value < lowest) {
                best = Some((value, step));
            }
        }
        best.map(|(_, step)| step)
    }

    /// Whether moving from `cell` by `step` stays on open cells. Diagonals are
    /// refused when either orthogonal corner is blocked.
    fn walkable(&self, cell: IVec2, step: IVec2) -> bool {
        let target = cell + step;
        if !self.in_bounds(target) || self.is_blocked(target) {
            return false;
        }
        if step.x != 0 && step.y != 0 {
            let side_a = cell + IVec2::new(step.x, 0);
            let side_b = cell + IVec2::new(0, step.y);
            if self.is_blocked(side_a) || self.is_blocked(side_b) {
                return false;
            }
        }
        true
    }
}

impl Default for FlowField {
    fn default() -> Self {
        Self::new(50.0, 10)
    }
}
