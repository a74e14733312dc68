use bevy::prelude::*;

use crate::game::config::{GameConfig, GameConfigHandle};
use crate::game::simulation::physics::{steer_toward, update_headings};
use crate::game::simulation::{ClockId, PhysicsBody, SimConfig, SimScheduleExt, SimSet};
use crate::game::unit::Player;
use crate::game::{GameState, StateRequest};

/// Player acceleration cap, as a multiple of the pursuers' steering force.
const PLAYER_RESPONSIVENESS: f32 = 2.0;

pub struct ControlPlugin;

impl Plugin for ControlPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MoveIntent>()
           .add_systems(Update, (read_movement, handle_pause))
           .add_ticked_sim_systems(SimSet::Gameplay, ClockId::RUNNING, drive_player.before(update_headings));
    }
}

/// Unit-length (or zero) movement direction sampled from input each frame.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct MoveIntent(pub Vec2);

fn read_movement(
    keyboard: Res<ButtonInput<KeyCode>>,
    config_handle: Res<GameConfigHandle>,
    game_configs: Res<Assets<GameConfig>>,
    mut intent: ResMut<MoveIntent>,
) {
    let default_config = GameConfig::default();
    let config = game_configs.get(&config_handle.0).unwrap_or(&default_config);

    let mut direction = Vec2::ZERO;
    if keyboard.pressed(config.key_move_up) {
        direction.y += 1.0;
    }
    if keyboard.pressed(config.key_move_down) {
        direction.y -= 1.0;
    }
    if keyboard.pressed(config.key_move_left) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(config.key_move_right) {
        direction.x += 1.0;
    }
    intent.0 = direction.normalize_or_zero();
}

/// Pause toggles Running/Paused; from a level-up screen it resumes.
fn handle_pause(
    keyboard: Res<ButtonInput<KeyCode>>,
    config_handle: Res<GameConfigHandle>,
    game_configs: Res<Assets<GameConfig>>,
    state: Res<State<GameState>>,
    mut requests: MessageWriter<StateRequest>,
) {
    let Some(config) = game_configs.get(&config_handle.0) else { return };
    if !keyboard.just_pressed(config.key_pause) {
        return;
    }

    let next = match state.get() {
        GameState::Running => GameState::Paused,
        GameState::Paused | GameState::LevelUp => GameState::Running,
        GameState::GameOver => return,
    };
    requests.write(StateRequest(next));
}

/// Accelerate the player toward the requested velocity. Knockback decays
/// instead of being overwritten.
fn drive_player(
    mut player: Query<&mut PhysicsBody, With<Player>>,
    intent: Res<MoveIntent>,
    sim_config: Res<SimConfig>,
) {
    let Ok(mut body) = player.single_mut() else { return };
    let desired = intent.0 * sim_config.player_speed;
    let steer = steer_toward(
        body.velocity,
        desired,
        sim_config.max_steering_force * PLAYER_RESPONSIVENESS,
        sim_config.delta(),
    );
    body.acceleration += steer;
}
