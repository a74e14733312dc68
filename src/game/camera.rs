use bevy::prelude::*;
use bevy::input::mouse::MouseWheel;

use crate::game::unit::Player;

pub struct FollowCameraPlugin;

impl Plugin for FollowCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
           .add_systems(Update, (follow_player, zoom_camera));
    }
}

#[derive(Component)]
pub struct FollowCamera;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, FollowCamera));
}

/// Ease toward the player's rendered position.
fn follow_player(
    mut cameras: Query<&mut Transform, (With<FollowCamera>, Without<Player>)>,
    player: Query<&Transform, With<Player>>,
    time: Res<Time>,
) {
    let Ok(mut camera) = cameras.single_mut() else { return };
    let Ok(target) = player.single() else { return };

    let blend = (time.delta_secs() * 5.0).min(1.0);
    let goal = target.translation.truncate();
    let current = camera.translation.truncate();
    let next = current.lerp(goal, blend);
    camera.translation.x = next.x;
    camera.translation.y = next.y;
}

fn zoom_camera(
    mut cameras: Query<&mut Projection, With<FollowCamera>>,
    mut scroll_evr: MessageReader<MouseWheel>,
) {
    let Ok(mut projection) = cameras.single_mut() else { return };
    let Projection::Orthographic(ortho) = projection.as_mut() else { return };

    for ev in scroll_evr.read() {
        ortho.scale = (ortho.scale * (1.0 - ev.y * 0.1)).clamp(0.25, 4.0);
    }
}
