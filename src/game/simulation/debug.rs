/// Debug visualization systems for the simulation.
///
/// This module handles all debug rendering including:
/// - Collider outlines, tinted by touch state
/// - Pursuit field arrows and blocked cells
/// - Collision grid occupancy
///
/// Everything here runs in `Update` and only reads simulation state.

use bevy::prelude::*;

use crate::game::config::{GameConfig, GameConfigHandle};
use crate::game::geometry::ColliderShape;
use super::components::{Collider, SimGlobalTransform, Trigger};
use super::resources::{CollisionGrid, DebugConfig, PursuitField};

// ============================================================================
// Debug Toggle
// ============================================================================

/// Toggle debug visualization modes with keyboard
pub fn toggle_debug(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mut debug_config: ResMut<DebugConfig>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    grid: Res<CollisionGrid>,
    field: Res<PursuitField>,
) {
    let (Some(keyboard), Some(config_handle)) = (keyboard, config_handle) else { return };
    let Some(config) = game_configs.get(&config_handle.0) else { return };

    if keyboard.just_pressed(config.key_debug_colliders) {
        debug_config.show_colliders = !debug_config.show_colliders;
        info!("Collider debug: {}", debug_config.show_colliders);
    }
    if keyboard.just_pressed(config.key_debug_flow) {
        debug_config.show_flow_field = !debug_config.show_flow_field;
        if debug_config.show_flow_field {
            info!("Flow field debug ENABLED");
            info!("  Field size: {}x{} cells of {}", field.0.side(), field.0.side(), field.0.cell_size());
            info!("  Origin: {:?}", field.0.origin());
        } else {
            info!("Flow field debug disabled");
        }
    }
    if keyboard.just_pressed(config.key_debug_grid) {
        debug_config.show_spatial_hash = !debug_config.show_spatial_hash;
        if debug_config.show_spatial_hash {
            info!("Spatial hash debug ENABLED");
            info!("  Bodies: {} in {} cells", grid.0.len(), grid.0.occupied_len());
            info!("  Pooled buckets: {}", grid.0.pool().pooled_buckets());
        } else {
            info!("Spatial hash debug disabled");
        }
    }
}

// ============================================================================
// Collider Visualization
// ============================================================================

pub fn draw_colliders(
    debug_config: Res<DebugConfig>,
    colliders: Query<(&SimGlobalTransform, &Collider, Has<Trigger>)>,
    mut gizmos: Gizmos,
) {
    if !debug_config.show_colliders {
        return;
    }

    for (global, collider, is_trigger) in colliders.iter() {
        let color = if is_trigger {
            Color::srgb(0.3, 0.6, 1.0)
        } else if collider.touching.last.is_empty() {
            Color::srgb(0.2, 1.0, 0.2)
        } else {
            Color::srgb(1.0, 0.3, 0.2)
        };
        draw_shape(&mut gizmos, &collider.shape, global.position(), color);
    }
}

fn draw_shape(gizmos: &mut Gizmos, shape: &ColliderShape, position: Vec2, color: Color) {
    match *shape {
        ColliderShape::Circle { radius } => {
            gizmos.circle_2d(position, radius, color);
        }
        ColliderShape::Box { half_extents } => {
            gizmos.rect_2d(position, half_extents * 2.0, color);
        }
    }
}

// ============================================================================
// Flow Field Visualization
// ============================================================================

/// Arrow per reachable cell, cross per blocked cell.
pub fn draw_flow_field(
    debug_config: Res<DebugConfig>,
    field: Res<PursuitField>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut gizmos: Gizmos,
) {
    if !debug_config.show_flow_field {
        return;
    }

    let arrow_scale = config_handle
        .and_then(|handle| game_configs.get(&handle.0))
        .map_or(0.4, |config| config.debug_flow_arrow_scale);

    let field = &field.0;
    let w = field.side_width();
    let half = field.cell_size() * 0.5;
    for y in -w..=w {
        for x in -w..=w {
            let cell = IVec2::new(x, y);
            let center = field.cell_center(cell);

            if field.is_blocked(cell) {
                let color = Color::srgb(0.8, 0.2, 0.2);
                gizmos.line_2d(center - Vec2::splat(half), center + Vec2::splat(half), color);
                gizmos.line_2d(center + Vec2::new(-half, half), center + Vec2::new(half, -half), color);
                continue;
            }

            let Some(direction) = field.flow(cell) else { continue };
            if direction != Vec2::ZERO {
                let end = center + direction * field.cell_size() * arrow_scale;
                gizmos.arrow_2d(center, end, Color::srgb(0.5, 0.5, 1.0));
            }
        }
    }
}

// ============================================================================
// Spatial Hash Visualization
// ============================================================================

/// Outline occupied cells; brighter cells hold more bodies.
pub fn draw_spatial_hash(
    debug_config: Res<DebugConfig>,
    grid: Res<CollisionGrid>,
    mut gizmos: Gizmos,
) {
    if !debug_config.show_spatial_hash {
        return;
    }

    let map = &grid.0;
    for &key in map.occupied_keys() {
        let (min, size) = map.cell_bounds(key);
        let load = (map.cell_len(key) as f32 / 8.0).min(1.0);
        gizmos.rect_2d(min + size * 0.5, size, Color::srgba(1.0, 1.0, 0.0, 0.15 + 0.6 * load));
    }
}
