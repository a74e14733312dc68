/// Messages written by the simulation phases.

use bevy::prelude::*;

use crate::game::geometry::Penetration;

/// Transition of one collider's contact with another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// Written during `SimSet::PostPhysics`, once per collider and touching
/// entity, after every positional correction of the step.
///
/// `other` may already be despawned when an `Exit` is read; check it with a
/// query before use. For `Exit`, `penetration` is the last overlap seen.
#[derive(Event, Message, Debug, Clone, Copy)]
pub struct CollisionEvent {
    pub entity: Entity,
    pub other: Entity,
    pub phase: ContactPhase,
    pub penetration: Penetration,
}

impl CollisionEvent {
    pub fn is_enter(&self) -> bool {
        self.phase == ContactPhase::Enter
    }
}
