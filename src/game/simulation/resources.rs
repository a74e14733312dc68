/// Resource definitions for the simulation.

use bevy::prelude::*;

use crate::game::spatial_hash::SpatialMap;
use crate::game::structures::FlowField;
use super::collision::CollisionBody;

// ============================================================================
// Tick Counter
// ============================================================================

/// Number of simulation steps run while the game was not paused.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

// ============================================================================
// Spatial Resources
// ============================================================================

/// Collision bodies bucketed by cell, rebuilt in `SimSet::PrePhysics`.
///
/// Written by the collision pass, read by steering in `SimSet::Gameplay`.
#[derive(Resource, Default)]
pub struct CollisionGrid(pub SpatialMap<CollisionBody>);

/// Steering field around the player, rebuilt every gameplay step.
#[derive(Resource, Default)]
pub struct PursuitField(pub FlowField);

// ============================================================================
// Simulation Configuration
// ============================================================================

/// Runtime simulation parameters, copied from [`InitialConfig`] at startup.
///
/// Speeds are in world units per second, durations in seconds. Tuning values
/// are placeholders meant to be overridden from `initial_config.ron`.
///
/// [`InitialConfig`]: crate::game::config::InitialConfig
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    pub tick_rate: f64,

    // Collision
    pub spatial_cell_size: f32,
    pub collision_parallel: bool,

    // Flow field
    pub flow_cell_size: f32,
    pub flow_side_width: i32,
    pub crowd_weight: u8,

    // Movement
    pub player_speed: f32,
    pub pursuer_speed: f32,
    pub pursuer_radius: f32,
    pub pursuer_health: f32,
    pub pursuer_drag: f32,
    pub max_steering_force: f32,

    // Flocking
    pub neighbor_radius: f32,
    pub separation_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,

    // Combat
    pub contact_damage: f32,
    pub invulnerability_secs: f32,
    pub knockback: f32,
    pub fire_interval_secs: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_pierce: f32,
    pub projectile_lifetime_secs: f32,

    // Pickups
    pub pickup_range: f32,
    pub pickup_speed: f32,
    pub xp_first_level: f32,
    pub xp_growth: f32,

    // Spawning
    pub spawn_interval_secs: f32,
    pub spawn_radius: f32,
    pub spawn_batch: usize,
    pub max_pursuers: usize,
}

impl SimConfig {
    /// Seconds advanced by one simulation step.
    pub fn delta(&self) -> f32 {
        (1.0 / self.tick_rate) as f32
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            spatial_cell_size: 64.0,
            collision_parallel: true,
            flow_cell_size: 50.0,
            flow_side_width: 10,
            crowd_weight: 2,
            player_speed: 180.0,
            pursuer_speed: 70.0,
            pursuer_radius: 17.0,
            pursuer_health: 3.0,
            pursuer_drag: 2.0,
            max_steering_force: 400.0,
            neighbor_radius: 60.0,
            separation_radius: 40.0,
            separation_weight: 1.5,
            alignment_weight: 0.5,
            contact_damage: 1.0,
            invulnerability_secs: 0.3,
            knockback: 120.0,
            fire_interval_secs: 0.5,
            projectile_speed: 400.0,
            projectile_damage: 1.0,
            projectile_pierce: 2.0,
            projectile_lifetime_secs: 5.0,
            pickup_range: 100.0,
            pickup_speed: 300.0,
            xp_first_level: 5.0,
            xp_growth: 1.6,
            spawn_interval_secs: 0.5,
            spawn_radius: 500.0,
            spawn_batch: 1,
            max_pursuers: 400,
        }
    }
}

// ============================================================================
// Debug Configuration
// ============================================================================

/// Debug visualization toggles. Drawing never touches simulation state.
#[derive(Resource, Debug, Clone, Default)]
pub struct DebugConfig {
    pub show_colliders: bool,
    pub show_flow_field: bool,
    pub show_spatial_hash: bool,
}
