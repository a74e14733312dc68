use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::simulation::{layers, Collider, PhysicsBody, SimConfig, SimGlobalTransform, SimTransform};
use crate::game::unit::{Player, Pursuer};

use super::components::Health;

/// Ring spawner for the horde. Seeded so a run can be replayed.
#[derive(Resource)]
pub struct PursuerSpawner {
    rng: StdRng,
    pub spawned: u64,
}

impl PursuerSpawner {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), spawned: 0 }
    }

    /// Uniform point on the circle of `radius` around `center`.
    pub fn ring_point(&mut self, center: Vec2, radius: f32) -> Vec2 {
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        center + Vec2::from_angle(angle) * radius
    }
}

impl Default for PursuerSpawner {
    fn default() -> Self {
        Self::seeded(0x5eed)
    }
}

/// Runs on the `SPAWN` clock. Tops the horde up by one batch, never past
/// `max_pursuers`.
pub fn spawn_pursuers(
    mut commands: Commands,
    mut spawner: ResMut<PursuerSpawner>,
    player: Query<&SimGlobalTransform, With<Player>>,
    pursuers: Query<(), With<Pursuer>>,
    sim_config: Res<SimConfig>,
) {
    let Ok(player_transform) = player.single() else { return };

    let alive = pursuers.iter().count();
    let batch = sim_config.spawn_batch.min(sim_config.max_pursuers.saturating_sub(alive));
    for _ in 0..batch {
        let position = spawner.ring_point(player_transform.position(), sim_config.spawn_radius);
        commands.spawn(pursuer_bundle(position, &sim_config));
        spawner.spawned += 1;
    }

    if batch > 0 && spawner.spawned % 100 == 0 {
        info!("[SPAWNER] {} pursuers spawned, {} alive", spawner.spawned, alive + batch);
    }
}

pub fn pursuer_bundle(position: Vec2, sim_config: &SimConfig) -> impl Bundle {
    (
        Pursuer,
        SimTransform::from_position(position),
        PhysicsBody::default().with_drag(sim_config.pursuer_drag),
        Collider::circle(sim_config.pursuer_radius).with_layers(layers::PURSUER, layers::ALL),
        Health::new(sim_config.pursuer_health),
    )
}
