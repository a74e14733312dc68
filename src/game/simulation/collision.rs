/// Collision detection, resolution, and contact event emission.
///
/// This module handles:
/// - Rebuilding the collision grid from collider snapshots (PrePhysics)
/// - The cell-local narrow phase, run in parallel across occupied cells (OnPhysics)
/// - Writing corrections and contacts back to entities (OnPhysics)
/// - Diffing touch sets into Enter/Stay/Exit messages (PostPhysics)

use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPool};
use std::ops::{AddAssign, Range};

use crate::game::geometry::{penetration, ColliderShape};
use crate::game::spatial_hash::{SpatialMap, FORWARD_NEIGHBORS};
use super::components::*;
use super::components::Trigger;
use super::events::{CollisionEvent, ContactPhase};
use super::resources::*;

#[cfg(test)]
#[path = "collision_tests.rs"]
mod tests;

/// Occupied cells handed to each task of the parallel narrow phase.
const CELLS_PER_TASK: usize = 16;

// ============================================================================
// Grid Snapshot
// ============================================================================

/// Collider state copied into the grid for one step.
///
/// The narrow phase works on these snapshots only, so it never touches the
/// ECS while workers run. Corrections and contacts are written back to the
/// owning entity afterwards.
#[derive(Debug, Clone)]
pub struct CollisionBody {
    pub entity: Entity,
    pub position: Vec2,
    pub velocity: Vec2,
    pub shape: ColliderShape,
    pub layers: u32,
    pub mask: u32,
    pub bounce: f32,
    pub trigger: bool,
    /// Total displacement applied by the narrow phase this step.
    pub correction: Vec2,
    pub contacts: ContactSet,
}

impl CollisionBody {
    pub fn new(entity: Entity, position: Vec2, collider: &Collider) -> Self {
        Self {
            entity,
            position,
            velocity: Vec2::ZERO,
            shape: collider.shape,
            layers: collider.layers,
            mask: collider.mask,
            bounce: 0.0,
            trigger: false,
            correction: Vec2::ZERO,
            contacts: ContactSet::new(),
        }
    }

    /// Whether this body's mask admits `other`'s layers. Checked per side.
    pub fn accepts(&self, other: &CollisionBody) -> bool {
        self.mask & other.layers != 0
    }
}

/// Counters reported by the narrow phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NarrowPhaseStats {
    pub candidate_pairs: usize,
    pub layer_filtered: usize,
    pub overlapping: usize,
    pub resolved: usize,
}

impl AddAssign for NarrowPhaseStats {
    fn add_assign(&mut self, rhs: Self) {
        self.candidate_pairs += rhs.candidate_pairs;
        self.layer_filtered += rhs.layer_filtered;
        self.overlapping += rhs.overlapping;
        self.resolved += rhs.resolved;
    }
}

// ============================================================================
// Narrow Phase
// ============================================================================

/// Test one candidate pair and resolve it in place.
///
/// The body with the lower entity id is treated as `A`. Each side records the
/// contact only if its own mask accepts the other's layers. Triggers never
/// move; otherwise the depth is split by bounce share along the normal.
pub fn collide_pair(x: &mut CollisionBody, y: &mut CollisionBody, stats: &mut NarrowPhaseStats) {
    stats.candidate_pairs += 1;
    let (a, b) = if x.entity <= y.entity { (x, y) } else { (y, x) };

    let a_accepts = a.accepts(b);
    let b_accepts = b.accepts(a);
    if !a_accepts && !b_accepts {
        stats.layer_filtered += 1;
        return;
    }

    let Some(pen) = penetration(&a.shape, a.position, &b.shape, b.position) else { return };
    stats.overlapping += 1;

    if a_accepts {
        a.contacts.push(Contact { other: b.entity, penetration: pen });
    }
    if b_accepts {
        b.contacts.push(Contact { other: a.entity, penetration: pen.flipped() });
    }

    if a.trigger || b.trigger {
        return;
    }
    let total_bounce = a.bounce + b.bounce;
    if total_bounce <= 0.0 {
        return;
    }

    let depth_a = a.bounce / total_bounce * pen.depth;
    let shift_a = pen.normal * depth_a;
    let shift_b = -pen.normal * (pen.depth - depth_a);
    a.position += shift_a;
    a.correction += shift_a;
    b.position += shift_b;
    b.correction += shift_b;
    stats.resolved += 1;
}

/// Pair every body in the cell at `slot` with the rest of its cell and with
/// the forward neighbour cells.
///
/// Locks are taken home cell first, then one forward neighbour at a time.
/// Forward neighbours always order after the home cell, so no two workers can
/// wait on each other.
fn process_cell(map: &SpatialMap<CollisionBody>, slot: usize, key: IVec2) -> NarrowPhaseStats {
    let mut stats = NarrowPhaseStats::default();
    let mut home = map.lock_slot(slot);

    for j in 1..home.len() {
        let (before, rest) = home.split_at_mut(j);
        let b = &mut rest[0];
        for a in before.iter_mut() {
            collide_pair(a, b, &mut stats);
        }
    }

    for offset in FORWARD_NEIGHBORS {
        let Some(neighbor_slot) = map.slot_of(key + offset) else { continue };
        let mut neighbor = map.lock_slot(neighbor_slot);
        for a in home.iter_mut() {
            for b in neighbor.iter_mut() {
                collide_pair(a, b, &mut stats);
            }
        }
    }

    stats
}

fn process_cells(map: &SpatialMap<CollisionBody>, slots: Range<usize>) -> NarrowPhaseStats {
    let keys = map.occupied_keys();
    let mut stats = NarrowPhaseStats::default();
    for slot in slots {
        stats += process_cell(map, slot, keys[slot]);
    }
    stats
}

/// Run the narrow phase over every occupied cell.
///
/// With `parallel`, cells are split into batches on the compute task pool and
/// this call returns only after every batch has finished.
pub fn narrow_phase(map: &SpatialMap<CollisionBody>, parallel: bool) -> NarrowPhaseStats {
    let cells = map.occupied_len();
    if !parallel || cells <= CELLS_PER_TASK {
        return process_cells(map, 0..cells);
    }

    let pool = ComputeTaskPool::get_or_init(TaskPool::default);
    let batches = pool.scope(|scope| {
        for start in (0..cells).step_by(CELLS_PER_TASK) {
            let end = (start + CELLS_PER_TASK).min(cells);
            scope.spawn(async move { process_cells(map, start..end) });
        }
    });

    let mut stats = NarrowPhaseStats::default();
    for batch in batches {
        stats += batch;
    }
    stats
}

// ============================================================================
// Systems
// ============================================================================

/// Clear and refill the collision grid from every collider's global position.
pub fn rebuild_collision_grid(
    mut grid: ResMut<CollisionGrid>,
    colliders: Query<(Entity, &SimGlobalTransform, &Collider, Option<&PhysicsBody>, Has<Trigger>)>,
    sim_config: Res<SimConfig>,
    mut warned_cell_size: Local<bool>,
) {
    let map = &mut grid.0;
    map.set_cell_size(sim_config.spatial_cell_size);
    map.clear();

    let mut largest_extent = 0.0f32;
    for (entity, global, collider, body, is_trigger) in colliders.iter() {
        largest_extent = largest_extent.max(collider.shape.extent().max_element());

        let mut snapshot = CollisionBody::new(entity, global.position(), collider);
        if let Some(body) = body {
            snapshot.velocity = body.velocity;
            snapshot.bounce = body.bounce;
        }
        snapshot.trigger = is_trigger;
        map.insert(snapshot.position, snapshot);
    }

    // Overlapping pairs further apart than one cell would be missed.
    if !*warned_cell_size && largest_extent * 2.0 > map.cell_size() {
        warn!(
            "[COLLISION_GRID] Collider extent {:.1} exceeds half the cell size {:.1}; some contacts may be missed",
            largest_extent,
            map.cell_size()
        );
        *warned_cell_size = true;
    }
}

/// Narrow phase plus write-back of corrections and contacts.
///
/// Entities despawned since the grid was built are skipped.
pub fn resolve_collisions(
    mut grid: ResMut<CollisionGrid>,
    mut bodies: Query<(&mut SimTransform, &mut SimGlobalTransform, &mut Collider)>,
    sim_config: Res<SimConfig>,
    tick: Res<SimTick>,
) {
    let start_time = std::time::Instant::now();
    let stats = narrow_phase(&grid.0, sim_config.collision_parallel);

    let mut corrected = 0usize;
    let mut stale = 0usize;
    grid.0.for_each_mut(|_, snapshot| {
        let Ok((mut local, mut global, mut collider)) = bodies.get_mut(snapshot.entity) else {
            stale += 1;
            return;
        };
        if snapshot.correction != Vec2::ZERO {
            local.position += snapshot.correction;
            global.0.position += snapshot.correction;
            corrected += 1;
        }
        if !snapshot.contacts.is_empty() {
            std::mem::swap(&mut collider.touching.current, &mut snapshot.contacts);
        }
    });

    if stale > 0 {
        debug!("[COLLISION_RESOLVE] Skipped {} bodies despawned since grid rebuild", stale);
    }

    let duration = start_time.elapsed();
    if duration.as_millis() > 2 || tick.0 % 100 == 0 {
        info!(
            "[COLLISION_RESOLVE] {:?} | Bodies: {} | Cells: {} | Candidates: {} | Layer filtered: {} | \
             Overlapping: {} | Resolved: {} | Corrected bodies: {}",
            duration,
            grid.0.len(),
            grid.0.occupied_len(),
            stats.candidate_pairs,
            stats.layer_filtered,
            stats.overlapping,
            stats.resolved,
            corrected
        );
    }
}

/// Diff each collider's touch sets into Enter/Stay/Exit messages, then swap
/// the buffers so this step's contacts become next step's history.
pub fn emit_collision_events(
    mut colliders: Query<(Entity, &mut Collider)>,
    mut events: MessageWriter<CollisionEvent>,
) {
    for (entity, mut collider) in colliders.iter_mut() {
        if collider.touching.current.is_empty() && collider.touching.last.is_empty() {
            continue;
        }
        let touching = &mut collider.touching;

        for contact in touching.current.iter() {
            let phase = if touching.was_touching(contact.other) {
                ContactPhase::Stay
            } else {
                ContactPhase::Enter
            };
            events.write(CollisionEvent {
                entity,
                other: contact.other,
                phase,
                penetration: contact.penetration,
            });
        }

        for contact in touching.last.iter() {
            if !touching.is_touching(contact.other) {
                events.write(CollisionEvent {
                    entity,
                    other: contact.other,
                    phase: ContactPhase::Exit,
                    penetration: contact.penetration,
                });
            }
        }

        touching.swap();
    }
}
