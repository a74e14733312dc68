use bevy::prelude::*;

use crate::game::simulation::{
    layers, Collider, CollisionEvent, Heading, PhysicsBody, Scenery, SimConfig, SimGlobalTransform, SimTransform,
    Trigger,
};
use crate::game::unit::Pursuer;

use super::components::*;

const PROJECTILE_RADIUS: f32 = 4.0;

/// Resolve projectile hits on the step they start touching something.
///
/// Scenery stops a projectile outright. Each pursuer hit costs the projectile
/// one point of its own health; at zero it is gone.
pub fn projectile_hits(
    mut commands: Commands,
    mut events: MessageReader<CollisionEvent>,
    mut projectiles: Query<(&Projectile, &mut Health), Without<Pursuer>>,
    mut pursuers: Query<&mut Health, With<Pursuer>>,
    scenery: Query<(), With<Scenery>>,
) {
    for event in events.read().filter(|e| e.is_enter()) {
        let Ok((projectile, mut pierce)) = projectiles.get_mut(event.entity) else { continue };
        if pierce.is_dead() {
            continue;
        }

        if scenery.contains(event.other) {
            pierce.value = 0.0;
        } else if let Ok(mut target) = pursuers.get_mut(event.other) {
            if target.is_dead() {
                continue;
            }
            target.damage(projectile.damage);
            pierce.value -= 1.0;
        } else {
            continue;
        }

        if pierce.is_dead() {
            commands.entity(event.entity).try_despawn();
        }
    }
}

/// Count down each shooter and fire at the nearest pursuer, or along the
/// shooter's heading when there is none.
pub fn fire_shooters(
    mut commands: Commands,
    mut shooters: Query<(&mut Shooter, &SimGlobalTransform, Option<&Heading>)>,
    pursuers: Query<&SimGlobalTransform, With<Pursuer>>,
    sim_config: Res<SimConfig>,
) {
    let delta = sim_config.delta();
    for (mut shooter, transform, heading) in shooters.iter_mut() {
        shooter.cooldown -= delta;
        if shooter.cooldown > 0.0 {
            continue;
        }
        shooter.cooldown += shooter.interval.max(delta);

        let origin = transform.position();
        let nearest = pursuers
            .iter()
            .map(|p| p.position())
            .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)));
        let direction = nearest
            .map(|target| (target - origin).normalize_or_zero())
            .filter(|d| *d != Vec2::ZERO)
            .or_else(|| heading.map(|h| h.0))
            .unwrap_or(Vec2::X);

        spawn_projectile(&mut commands, origin, direction, &sim_config);
    }
}

pub fn spawn_projectile(commands: &mut Commands, origin: Vec2, direction: Vec2, sim_config: &SimConfig) -> Entity {
    commands
        .spawn((
            Projectile { damage: sim_config.projectile_damage },
            Health::new(sim_config.projectile_pierce),
            DespawnTimed::after(sim_config.projectile_lifetime_secs),
            SimTransform::from_position(origin),
            PhysicsBody::default()
                .with_velocity(direction * sim_config.projectile_speed)
                .with_bounce(0.0),
            Heading(direction),
            Collider::circle(PROJECTILE_RADIUS).with_layers(layers::PROJECTILE, layers::PURSUER | layers::SCENERY),
            Trigger,
        ))
        .id()
}
