/// Damage, invulnerability and death handling.

use bevy::prelude::*;

use crate::game::simulation::{
    layers, Collider, CollisionEvent, ContactPhase, PhysicsBody, SimConfig, SimGlobalTransform, SimTransform, Trigger,
};
use crate::game::unit::{Player, Pursuer};
use crate::game::{GameState, StateRequest};

use super::components::*;
use super::events::DeathEvent;

const POWERUP_RADIUS: f32 = 6.0;
const POWERUP_EXPERIENCE: f32 = 1.0;
/// Period of `ClockId::INTERVAL`.
const INTERVAL_SECS: f32 = 0.1;
/// Menu ticks per half blink.
const BLINK_TICKS: u32 = 4;

pub fn tick_invulnerability(mut query: Query<&mut Health>, sim_config: Res<SimConfig>) {
    let delta = sim_config.delta();
    for mut health in query.iter_mut() {
        if health.invulnerable_for > 0.0 {
            health.invulnerable_for = (health.invulnerable_for - delta).max(0.0);
        }
    }
}

/// Pursuers touching the player hurt it and knock it back along the contact
/// normal. Applies on Enter and Stay; invulnerability limits the rate.
pub fn apply_contact_damage(
    mut events: MessageReader<CollisionEvent>,
    mut players: Query<(&mut Health, &mut PhysicsBody), With<Player>>,
    pursuers: Query<(), With<Pursuer>>,
    sim_config: Res<SimConfig>,
) {
    for event in events.read() {
        if event.phase == ContactPhase::Exit {
            continue;
        }
        let Ok((mut health, mut body)) = players.get_mut(event.entity) else { continue };
        if !pursuers.contains(event.other) {
            continue;
        }
        if health.damage(sim_config.contact_damage) {
            body.velocity += event.penetration.normal * sim_config.knockback;
            debug!(
                "[HEALTH] Player {:?} hit by {:?}: {}/{}",
                event.entity, event.other, health.value, health.max
            );
        }
    }
}

/// Write one `DeathEvent` per entity whose health ran out.
pub fn check_deaths(
    mut commands: Commands,
    query: Query<(Entity, &Health, Option<&PhysicsBody>), (Without<Dead>, Without<Projectile>)>,
    mut deaths: MessageWriter<DeathEvent>,
) {
    for (entity, health, body) in query.iter() {
        if !health.is_dead() {
            continue;
        }
        let direction = body.map_or(Vec2::ZERO, |b| b.velocity.normalize_or_zero());
        deaths.write(DeathEvent { entity, direction });
        commands.entity(entity).insert(Dead);
    }
}

/// Dead pursuers drop a powerup and despawn. A dead player ends the run.
pub fn handle_deaths(
    mut commands: Commands,
    mut deaths: MessageReader<DeathEvent>,
    pursuers: Query<&SimGlobalTransform, With<Pursuer>>,
    players: Query<(), With<Player>>,
    mut requests: MessageWriter<StateRequest>,
) {
    for death in deaths.read() {
        if let Ok(transform) = pursuers.get(death.entity) {
            spawn_powerup(&mut commands, transform.position());
            commands.entity(death.entity).try_despawn();
        } else if players.contains(death.entity) {
            info!("[HEALTH] Player {:?} died", death.entity);
            requests.write(StateRequest(GameState::GameOver));
        }
    }
}

pub fn spawn_powerup(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            Powerup { experience: POWERUP_EXPERIENCE },
            SimTransform::from_position(position),
            PhysicsBody::default().with_bounce(0.0),
            Collider::circle(POWERUP_RADIUS).with_layers(layers::POWERUP, layers::PLAYER),
            Trigger,
        ))
        .id()
}

pub fn tick_despawn_timers(
    mut commands: Commands,
    mut query: Query<(Entity, &mut DespawnTimed)>,
    sim_config: Res<SimConfig>,
) {
    let delta = sim_config.delta();
    for (entity, mut timer) in query.iter_mut() {
        timer.remaining -= delta;
        if timer.remaining <= 0.0 {
            commands.entity(entity).try_despawn();
        }
    }
}

/// Runs on the interval clock, so regeneration stops with the simulation.
pub fn regenerate_health(mut query: Query<(&mut Health, &Regeneration), Without<Dead>>) {
    for (mut health, regeneration) in query.iter_mut() {
        if health.value < health.max {
            health.heal(regeneration.per_second * INTERVAL_SECS);
        }
    }
}

/// Flashes invulnerable entities.
///
/// Driven by the menu clock: while paused the immunity window is frozen but
/// the flash keeps animating.
pub fn blink_invulnerable(mut query: Query<(&Health, &mut Visibility)>, mut ticks: Local<u32>) {
    *ticks = ticks.wrapping_add(1);
    let lit = (*ticks / BLINK_TICKS) % 2 == 0;
    for (health, mut visibility) in query.iter_mut() {
        let target = if lit || !health.is_invulnerable() { Visibility::Inherited } else { Visibility::Hidden };
        visibility.set_if_neq(target);
    }
}
