use bevy::prelude::*;

use crate::game::geometry::ColliderShape;
use crate::game::simulation::{layers, Collider, SimTransform};

/// Gives every new collider a flat sprite sized to its shape.
pub(super) fn spawn_collider_visuals(
    mut commands: Commands,
    query: Query<(Entity, &Collider, &SimTransform), Added<Collider>>,
) {
    for (entity, collider, local) in query.iter() {
        let size = match collider.shape {
            ColliderShape::Circle { radius } => Vec2::splat(radius * 2.0),
            ColliderShape::Box { half_extents } => half_extents * 2.0,
        };
        commands.entity(entity).insert((
            Sprite::from_color(layer_color(collider.layers), size),
            Transform::from_translation(local.position.extend(0.0)),
        ));
    }
}

fn layer_color(collider_layers: u32) -> Color {
    if collider_layers & layers::PLAYER != 0 {
        Color::srgb(0.2, 0.6, 1.0)
    } else if collider_layers & layers::PURSUER != 0 {
        Color::srgb(0.8, 0.2, 0.2)
    } else if collider_layers & layers::PROJECTILE != 0 {
        Color::srgb(1.0, 1.0, 0.4)
    } else if collider_layers & layers::POWERUP != 0 {
        Color::srgb(0.3, 1.0, 0.4)
    } else {
        Color::srgb(0.45, 0.45, 0.45)
    }
}

/// Copies simulation transforms into render transforms.
///
/// Local into local: Bevy's own hierarchy then composes children the same way
/// the simulation does.
pub(super) fn sync_visuals(mut query: Query<(&mut Transform, &SimTransform), Changed<SimTransform>>) {
    for (mut transform, local) in query.iter_mut() {
        transform.translation.x = local.position.x;
        transform.translation.y = local.position.y;
        transform.rotation = Quat::from_rotation_z(local.rotation);
        transform.scale = local.scale.extend(1.0);
    }
}
