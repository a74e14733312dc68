use bevy::prelude::*;

use crate::game::simulation::{CollisionEvent, PhysicsBody, SimConfig, SimGlobalTransform};
use crate::game::{GameState, StateRequest};

use super::components::*;
use super::events::LevelUpEvent;

/// Powerups within a collector's range fly toward the nearest collector;
/// the rest stay put.
pub fn attract_powerups(
    mut powerups: Query<(&SimGlobalTransform, &mut PhysicsBody), With<Powerup>>,
    collectors: Query<(&SimGlobalTransform, &PowerCollector)>,
) {
    for (transform, mut body) in powerups.iter_mut() {
        let position = transform.position();
        let pull = collectors
            .iter()
            .filter(|(c, collector)| c.position().distance_squared(position) <= collector.range * collector.range)
            .min_by(|(a, _), (b, _)| {
                a.position().distance_squared(position).total_cmp(&b.position().distance_squared(position))
            });

        body.velocity = match pull {
            Some((c, collector)) => (c.position() - position).normalize_or_zero() * collector.speed,
            None => Vec2::ZERO,
        };
    }
}

/// Collectors absorb powerups they start touching, gaining experience.
pub fn collect_powerups(
    mut commands: Commands,
    mut events: MessageReader<CollisionEvent>,
    mut collectors: Query<&mut Experience, With<PowerCollector>>,
    powerups: Query<&Powerup>,
    sim_config: Res<SimConfig>,
    mut level_ups: MessageWriter<LevelUpEvent>,
    mut requests: MessageWriter<StateRequest>,
    mut collected: Local<Vec<Entity>>,
) {
    collected.clear();
    for event in events.read().filter(|e| e.is_enter()) {
        let Ok(mut experience) = collectors.get_mut(event.entity) else { continue };
        let Ok(powerup) = powerups.get(event.other) else { continue };
        if collected.contains(&event.other) {
            continue;
        }
        collected.push(event.other);
        commands.entity(event.other).try_despawn();

        let gained = experience.gain(powerup.experience, sim_config.xp_growth);
        if gained > 0 {
            info!("[POWERUP] {:?} reached level {}", event.entity, experience.level);
            level_ups.write(LevelUpEvent { entity: event.entity, level: experience.level });
            requests.write(StateRequest(GameState::LevelUp));
        }
    }
}
