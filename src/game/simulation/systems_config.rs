/// Configuration initialization systems
///
/// Systems that handle loading and updating simulation configuration from:
/// - InitialConfig (loaded before startup from initial_config.ron)
/// - GameConfig (hot-reloadable runtime settings from game_config.ron)

use bevy::prelude::*;
use std::time::Duration;

use crate::game::config::{GameConfig, GameConfigHandle, InitialConfig};
use crate::game::structures::FlowField;
use super::clocks::{ClockId, TickSources};
use super::resources::*;

/// Initialize SimConfig from InitialConfig at startup
pub fn init_sim_config_from_initial(
    mut fixed_time: ResMut<Time<Fixed>>,
    mut sim_config: ResMut<SimConfig>,
    mut sources: ResMut<TickSources>,
    mut grid: ResMut<CollisionGrid>,
    mut field: ResMut<PursuitField>,
    initial_config: Option<Res<InitialConfig>>,
) {
    let default_config;
    let config = match &initial_config {
        Some(cfg) => cfg.as_ref(),
        None => {
            warn!("InitialConfig not found, using defaults");
            default_config = InitialConfig::default();
            &default_config
        }
    };

    apply_initial_config(&mut sim_config, config);
    fixed_time.set_timestep_seconds(1.0 / sim_config.tick_rate);

    match Duration::try_from_secs_f32(sim_config.spawn_interval_secs) {
        Ok(interval) if !interval.is_zero() => sources.set_interval(ClockId::SPAWN, interval),
        _ => warn!(
            "[CONFIG] Ignoring spawn interval {}s, keeping the default",
            sim_config.spawn_interval_secs
        ),
    }
    grid.0.set_cell_size(sim_config.spatial_cell_size);
    field.0 = FlowField::new(sim_config.flow_cell_size, sim_config.flow_side_width);

    info!(
        "SimConfig initialized: {} Hz, grid cell {}, pursuit field {}x{} cells of {}",
        sim_config.tick_rate,
        sim_config.spatial_cell_size,
        field.0.side(),
        field.0.side(),
        sim_config.flow_cell_size
    );
}

/// Copy every simulation value out of the loaded file.
pub fn apply_initial_config(sim_config: &mut SimConfig, config: &InitialConfig) {
    sim_config.tick_rate = config.tick_rate;
    sim_config.spatial_cell_size = config.spatial_cell_size;
    sim_config.collision_parallel = config.collision_parallel;
    sim_config.flow_cell_size = config.flow_cell_size;
    sim_config.flow_side_width = config.flow_side_width;
    sim_config.crowd_weight = config.crowd_weight;
    sim_config.player_speed = config.player_speed;
    sim_config.pursuer_speed = config.pursuer_speed;
    sim_config.pursuer_radius = config.pursuer_radius;
    sim_config.pursuer_health = config.pursuer_health;
    sim_config.pursuer_drag = config.pursuer_drag;
    sim_config.max_steering_force = config.max_steering_force;
    sim_config.neighbor_radius = config.neighbor_radius;
    sim_config.separation_radius = config.separation_radius;
    sim_config.separation_weight = config.separation_weight;
    sim_config.alignment_weight = config.alignment_weight;
    sim_config.contact_damage = config.contact_damage;
    sim_config.invulnerability_secs = config.invulnerability_secs;
    sim_config.knockback = config.knockback;
    sim_config.fire_interval_secs = config.fire_interval_secs;
    sim_config.projectile_speed = config.projectile_speed;
    sim_config.projectile_damage = config.projectile_damage;
    sim_config.projectile_pierce = config.projectile_pierce;
    sim_config.projectile_lifetime_secs = config.projectile_lifetime_secs;
    sim_config.pickup_range = config.pickup_range;
    sim_config.pickup_speed = config.pickup_speed;
    sim_config.xp_first_level = config.xp_first_level;
    sim_config.xp_growth = config.xp_growth;
    sim_config.spawn_interval_secs = config.spawn_interval_secs;
    sim_config.spawn_radius = config.spawn_radius;
    sim_config.spawn_batch = config.spawn_batch;
    sim_config.max_pursuers = config.max_pursuers;
}

/// Handle hot-reloadable runtime configuration
pub fn update_sim_from_runtime_config(
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut events: MessageReader<AssetEvent<GameConfig>>,
) {
    let Some(config_handle) = config_handle else { return };
    for event in events.read() {
        if event.is_modified(config_handle.0.id()) || event.is_loaded_with_dependencies(config_handle.0.id()) {
            if let Some(config) = game_configs.get(&config_handle.0) {
                // Systems read GameConfig directly; nothing is copied.
                info!("Runtime config loaded/updated (pause key {:?}, debug keys {:?}/{:?}/{:?})",
                      config.key_pause, config.key_debug_colliders, config.key_debug_flow, config.key_debug_grid);
            }
        }
    }
}
