/// Rigid-body integration.
///
/// Runs at the start of `SimSet::PrePhysics`, before the hierarchy is
/// propagated and the collision grid is rebuilt from the new positions.

use bevy::prelude::*;
use horde_macros::profile;

use super::components::*;
use super::resources::*;

/// Below this speed a body is considered at rest for heading purposes.
const HEADING_MIN_SPEED_SQ: f32 = 1e-6;

/// Semi-implicit Euler step for every body, in parallel.
///
/// `velocity += acceleration * dt`, then drag, then `position += velocity * dt`.
/// Acceleration is cleared so next step's steering starts from zero.
#[profile(2)]
pub fn integrate_bodies(
    mut query: Query<(&mut SimTransform, &mut PhysicsBody)>,
    sim_config: Res<SimConfig>,
    #[allow(unused_variables)] tick: Res<SimTick>,
) {
    let delta = sim_config.delta();

    query.par_iter_mut().for_each(|(mut transform, mut body)| {
        let body = &mut *body;
        body.velocity += body.acceleration * delta;
        body.acceleration = Vec2::ZERO;

        if body.drag > 0.0 {
            body.velocity *= (1.0 - body.drag * delta).max(0.0);
        }

        if body.velocity != Vec2::ZERO {
            transform.position += body.velocity * delta;
        }
    });

    crate::profile_log!(tick, "[INTEGRATE] {} bodies", query.iter().count());
}

/// Keep `Heading` pointing along the velocity of moving bodies.
pub fn update_headings(mut query: Query<(&PhysicsBody, &mut Heading)>) {
    for (body, mut heading) in query.iter_mut() {
        if body.velocity.length_squared() > HEADING_MIN_SPEED_SQ {
            heading.0 = body.velocity.normalize();
        }
    }
}

/// Seek-style steering: the acceleration that would reach `desired_velocity`
/// within one step of `delta` seconds, limited to `max_force`.
pub fn steer_toward(velocity: Vec2, desired_velocity: Vec2, max_force: f32, delta: f32) -> Vec2 {
    if delta <= 0.0 {
        return Vec2::ZERO;
    }
    ((desired_velocity - velocity) / delta).clamp_length_max(max_force)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steer_reaches_small_change_in_one_step() {
        let accel = steer_toward(Vec2::ZERO, Vec2::new(1.0, 0.0), 400.0, 0.1);
        assert!((accel - Vec2::new(10.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_steer_is_clamped() {
        let accel = steer_toward(Vec2::ZERO, Vec2::new(0.0, 100.0), 50.0, 0.1);
        assert!((accel.length() - 50.0).abs() < 1e-4);
        assert!(accel.y > 0.0);
    }
}
