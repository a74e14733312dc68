/// Component definitions for the simulation layer.
///
/// Transforms, rigid-body state, colliders with their touch sets, and the
/// markers the collision and pathfinding passes filter on.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::game::geometry::{ColliderShape, Penetration};

// ============================================================================
// Transform Components
// ============================================================================

/// Local transform, relative to the parent if the entity has one.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SimTransform {
    pub position: Vec2,
    pub scale: Vec2,
    /// Radians.
    pub rotation: f32,
}

impl SimTransform {
    pub fn from_position(position: Vec2) -> Self {
        Self { position, ..default() }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Compose a child transform onto this one: positions and rotations add,
    /// scales multiply.
    pub fn compose(&self, child: &SimTransform) -> SimTransform {
        SimTransform {
            position: self.position + child.position,
            scale: self.scale * child.scale,
            rotation: self.rotation + child.rotation,
        }
    }
}

impl Default for SimTransform {
    fn default() -> Self {
        Self { position: Vec2::ZERO, scale: Vec2::ONE, rotation: 0.0 }
    }
}

/// World-space transform derived from the hierarchy once per step.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct SimGlobalTransform(pub SimTransform);

impl SimGlobalTransform {
    pub fn position(&self) -> Vec2 {
        self.0.position
    }
}

// ============================================================================
// Physics Components
// ============================================================================

/// Integrated motion state.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[require(SimTransform, SimGlobalTransform)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    /// Reset to zero after each integration step; steering adds into it.
    pub acceleration: Vec2,
    /// Share of each positional correction this body absorbs. Zero never moves.
    pub bounce: f32,
    /// Fraction of velocity removed per second.
    pub drag: f32,
}

impl PhysicsBody {
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_bounce(mut self, bounce: f32) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self { velocity: Vec2::ZERO, acceleration: Vec2::ZERO, bounce: 1.0, drag: 0.0 }
    }
}

/// Facing direction. Keeps its last value while the body is at rest.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Heading(pub Vec2);

impl Default for Heading {
    fn default() -> Self {
        Self(Vec2::X)
    }
}

// ============================================================================
// Collision Components
// ============================================================================

/// Collision layer bits.
pub mod layers {
    pub const NONE: u32 = 0;
    pub const DEFAULT: u32 = 1 << 0;
    pub const PLAYER: u32 = 1 << 1;
    pub const PURSUER: u32 = 1 << 2;
    pub const PROJECTILE: u32 = 1 << 3;
    pub const POWERUP: u32 = 1 << 4;
    pub const SCENERY: u32 = 1 << 5;
    pub const ALL: u32 = u32::MAX;
}

/// One touching entity and the overlap seen from the collider's side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub other: Entity,
    pub penetration: Penetration,
}

pub type ContactSet = SmallVec<[Contact; 4]>;

/// Double-buffered set of touching entities.
///
/// The collision pass fills `current`; event emission diffs it against `last`
/// and then swaps the two buffers.
#[derive(Debug, Clone, Default)]
pub struct TouchSets {
    pub current: ContactSet,
    pub last: ContactSet,
}

impl TouchSets {
    /// Make this frame's contacts last frame's and start an empty frame.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.last);
        self.current.clear();
    }

    pub fn is_touching(&self, other: Entity) -> bool {
        self.current.iter().any(|c| c.other == other)
    }

    pub fn was_touching(&self, other: Entity) -> bool {
        self.last.iter().any(|c| c.other == other)
    }
}

/// Shape plus layer filtering.
///
/// This collider reports a contact with another only when `mask` intersects
/// the other's `layers`. A pair is skipped entirely when neither side's mask
/// matches.
#[derive(Component, Debug, Clone)]
#[require(SimTransform, SimGlobalTransform)]
pub struct Collider {
    pub shape: ColliderShape,
    pub layers: u32,
    pub mask: u32,
    pub touching: TouchSets,
}

impl Collider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            layers: layers::DEFAULT,
            mask: layers::ALL,
            touching: TouchSets::default(),
        }
    }

    pub fn circle(radius: f32) -> Self {
        Self::new(ColliderShape::circle(radius))
    }

    pub fn with_layers(mut self, layers: u32, mask: u32) -> Self {
        self.layers = layers;
        self.mask = mask;
        self
    }
}

/// Overlap-only collider: reports contacts, never pushed or pushing.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Trigger;

// ============================================================================
// Obstacle Components
// ============================================================================

/// Static level geometry. Blocks the pursuit flow field.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Scenery;
