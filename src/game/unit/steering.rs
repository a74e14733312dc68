use bevy::prelude::*;
use horde_macros::profile;

use crate::game::simulation::physics::steer_toward;
use crate::game::simulation::{
    layers, CollisionBody, CollisionGrid, PhysicsBody, PursuitField, SimConfig, SimGlobalTransform, SimTick,
};
use crate::game::spatial_hash::SpatialMap;
use crate::game::structures::FlowField;

use super::components::{Player, Pursuer};

#[cfg(test)]
#[path = "steering_tests.rs"]
mod tests;

/// Closer than this, separation uses a fixed push instead of 1/distance.
const MIN_SEPARATION_DIST: f32 = 0.5;

/// Inputs shared by every pursuer for one step.
#[derive(Debug, Clone, Copy)]
pub struct PursuitParams {
    pub speed: f32,
    pub neighbor_radius: f32,
    pub separation_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
}

impl PursuitParams {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            speed: config.pursuer_speed,
            neighbor_radius: config.neighbor_radius,
            separation_radius: config.separation_radius,
            separation_weight: config.separation_weight,
            alignment_weight: config.alignment_weight,
        }
    }
}

/// Velocity a pursuer wants this step.
///
/// The base direction is the field's flow at `position`. Outside the field, or
/// where the flow is zero (centre cell, unreachable cells), it heads straight
/// for the target. Separation and alignment only consider other pursuers
/// found in the collision grid.
pub fn desired_velocity(
    entity: Entity,
    position: Vec2,
    target: Vec2,
    field: &FlowField,
    grid: &SpatialMap<CollisionBody>,
    params: &PursuitParams,
) -> Vec2 {
    let toward = field
        .direction_at(position)
        .filter(|dir| *dir != Vec2::ZERO)
        .unwrap_or_else(|| (target - position).normalize_or_zero());

    let neighbor_radius_sq = params.neighbor_radius * params.neighbor_radius;
    let separation_radius_sq = params.separation_radius * params.separation_radius;

    let mut separation = Vec2::ZERO;
    let mut alignment = Vec2::ZERO;
    let mut neighbors = 0u32;

    grid.for_each_near(position, |other| {
        if other.entity == entity || other.layers & layers::PURSUER == 0 {
            return;
        }
        let diff = position - other.position;
        let dist_sq = diff.length_squared();
        if dist_sq > neighbor_radius_sq {
            return;
        }

        alignment += other.velocity;
        neighbors += 1;

        if dist_sq < separation_radius_sq {
            let dist = dist_sq.sqrt();
            if dist > MIN_SEPARATION_DIST {
                separation += diff / dist_sq;
            } else {
                separation += Vec2::X / MIN_SEPARATION_DIST;
            }
        }
    });

    let mut direction = toward;
    if neighbors > 0 {
        if params.separation_weight > 0.0 {
            direction += separation.normalize_or_zero() * params.separation_weight;
        }
        if params.alignment_weight > 0.0 {
            direction += (alignment / neighbors as f32).normalize_or_zero() * params.alignment_weight;
        }
    }

    direction.normalize_or_zero() * params.speed
}

/// Steers every pursuer toward the player along the pursuit field.
///
/// Reads the collision grid built this step, so it must run after the physics
/// phases. Writes only each pursuer's own acceleration.
#[profile(2)]
pub fn steer_pursuers(
    mut pursuers: Query<(Entity, &SimGlobalTransform, &mut PhysicsBody), With<Pursuer>>,
    player: Query<&SimGlobalTransform, (With<Player>, Without<Pursuer>)>,
    field: Res<PursuitField>,
    grid: Res<CollisionGrid>,
    sim_config: Res<SimConfig>,
    #[allow(unused_variables)] tick: Res<SimTick>,
) {
    let Ok(player_transform) = player.single() else {
        return;
    };
    let target = player_transform.position();
    let params = PursuitParams::from_config(&sim_config);
    let max_force = sim_config.max_steering_force;
    let delta = sim_config.delta();

    pursuers.par_iter_mut().for_each(|(entity, transform, mut body)| {
        let desired = desired_velocity(entity, transform.position(), target, &field.0, &grid.0, &params);
        let steer = steer_toward(body.velocity, desired, max_force, delta);
        body.acceleration += steer;
    });

    crate::profile_log!(tick, "[STEERING] {} pursuers", pursuers.iter().count());
}
