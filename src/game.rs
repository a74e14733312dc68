use bevy::prelude::*;

mod camera;
mod control;
pub mod config;
pub mod gameplay;
pub mod geometry;
pub mod pathfinding;
pub mod simulation;
pub mod spatial_hash;
pub mod structures;
pub mod unit;

use camera::FollowCameraPlugin;
use config::{GameConfigPlugin, InitialConfig};
use control::ControlPlugin;
use gameplay::{Experience, GameplayPlugin, Health, PowerCollector, Regeneration, Shooter};
use geometry::ColliderShape;
use pathfinding::PathfindingPlugin;
use simulation::systems_config::init_sim_config_from_initial;
use simulation::{layers, Collider, PhysicsBody, Scenery, SimConfig, SimDebugPlugin, SimTransform, SimulationPlugin};
use unit::{Player, UnitPlugin, UnitVisualsPlugin};

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Running,
    Paused,
    LevelUp,
    GameOver,
}

/// Ask for a state transition. Applied once per frame in `Update`.
#[derive(Event, Message, Debug, Clone, Copy)]
pub struct StateRequest(pub GameState);

/// Headless core: simulation, pathfinding, steering and gameplay, without
/// rendering, input or assets. Needs `StatesPlugin` (part of `DefaultPlugins`).
pub struct HordeCorePlugin;

impl Plugin for HordeCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
           .add_message::<StateRequest>()
           .add_plugins((SimulationPlugin, PathfindingPlugin, UnitPlugin, GameplayPlugin))
           .add_systems(Update, apply_state_requests);
    }
}

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            GameConfigPlugin,
            HordeCorePlugin,
            SimDebugPlugin,
            UnitVisualsPlugin,
            ControlPlugin,
            FollowCameraPlugin,
        ))
        .add_systems(Startup, setup_level.after(init_sim_config_from_initial));
    }
}

fn apply_state_requests(
    mut requests: MessageReader<StateRequest>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    // Last request wins; GameOver is final.
    let Some(request) = requests.read().last() else { return };
    if *state.get() == GameState::GameOver || *state.get() == request.0 {
        return;
    }
    info!("[STATE] {:?} -> {:?}", state.get(), request.0);
    next_state.set(request.0);
}

fn setup_level(mut commands: Commands, sim_config: Res<SimConfig>, initial_config: Option<Res<InitialConfig>>) {
    info!("Level setup started");
    let default_config;
    let config = match &initial_config {
        Some(cfg) => cfg.as_ref(),
        None => {
            default_config = InitialConfig::default();
            &default_config
        }
    };

    commands.spawn((
        Player,
        SimTransform::default(),
        PhysicsBody::default(),
        Collider::circle(config.player_radius).with_layers(layers::PLAYER, layers::ALL),
        Health::new(config.player_health).with_invulnerability(sim_config.invulnerability_secs),
        Regeneration { per_second: config.player_regen_per_sec },
        Shooter::every(sim_config.fire_interval_secs),
        PowerCollector { range: sim_config.pickup_range, speed: sim_config.pickup_speed },
        Experience::new(sim_config.xp_first_level),
    ));

    // Pillars on a ring, plus one long wall to the north.
    let ring = sim_config.spawn_radius * 0.5;
    for i in 0..config.wall_count {
        let angle = i as f32 / config.wall_count as f32 * std::f32::consts::TAU;
        commands.spawn((
            Scenery,
            SimTransform::from_position(Vec2::from_angle(angle) * ring),
            Collider::circle(config.wall_radius).with_layers(layers::SCENERY, layers::ALL),
        ));
    }
    commands.spawn((
        Scenery,
        SimTransform::from_position(Vec2::new(0.0, ring * 1.5)),
        Collider::new(ColliderShape::rect(config.wall_radius * 2.0, config.wall_radius)).with_layers(layers::SCENERY, layers::ALL),
    ));

    info!("Level setup complete: {} pillars", config.wall_count);
}
