use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Static configuration loaded once at startup. These values define the
/// simulation itself (step rate, grid sizes, movement and combat tuning) and
/// are not hot-reloaded while a run is in progress.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct InitialConfig {
    // Simulation
    pub tick_rate: f64,
    pub spatial_cell_size: f32,
    pub collision_parallel: bool,

    // Pursuit field
    pub flow_cell_size: f32,
    pub flow_side_width: i32,
    pub crowd_weight: u8,

    // Movement
    pub player_speed: f32,
    pub player_radius: f32,
    pub player_health: f32,
    pub player_regen_per_sec: f32,
    pub pursuer_speed: f32,
    pub pursuer_radius: f32,
    pub pursuer_health: f32,
    pub pursuer_drag: f32,
    pub max_steering_force: f32,

    // Flocking
    pub neighbor_radius: f32,
    pub separation_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,

    // Combat
    pub contact_damage: f32,
    pub invulnerability_secs: f32,
    pub knockback: f32,
    pub fire_interval_secs: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_pierce: f32,
    pub projectile_lifetime_secs: f32,

    // Pickups
    pub pickup_range: f32,
    pub pickup_speed: f32,
    pub xp_first_level: f32,
    pub xp_growth: f32,

    // Spawning
    pub spawn_interval_secs: f32,
    pub spawn_radius: f32,
    pub spawn_batch: usize,
    pub max_pursuers: usize,

    // Level
    pub wall_count: usize,
    pub wall_radius: f32,

    // Logging (binary only)
    pub log_dir: String,
    pub log_files_kept: usize,
}

impl InitialConfig {
    /// Read and validate a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_ron(&contents).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path: path.display().to_string(), source },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate > 0.0) {
            return Err(ConfigError::Invalid { field: "tick_rate", reason: format!("{} is not positive", self.tick_rate) });
        }
        if !(self.spatial_cell_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "spatial_cell_size",
                reason: format!("{} is not positive", self.spatial_cell_size),
            });
        }
        if !(self.flow_cell_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "flow_cell_size",
                reason: format!("{} is not positive", self.flow_cell_size),
            });
        }
        if self.flow_side_width < 0 {
            return Err(ConfigError::Invalid {
                field: "flow_side_width",
                reason: format!("{} is negative", self.flow_side_width),
            });
        }
        if self.crowd_weight == crate::game::structures::IMPASSABLE {
            return Err(ConfigError::Invalid { field: "crowd_weight", reason: "255 marks impassable cells".to_string() });
        }

        // Periods become `Duration`s or timer lengths; zero would fire every step.
        for (field, value) in [
            ("spawn_interval_secs", self.spawn_interval_secs),
            ("fire_interval_secs", self.fire_interval_secs),
            ("projectile_lifetime_secs", self.projectile_lifetime_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid { field, reason: format!("{} is not a positive duration", value) });
            }
        }
        for (field, value) in [
            ("invulnerability_secs", self.invulnerability_secs),
            ("player_regen_per_sec", self.player_regen_per_sec),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid { field, reason: format!("{} is negative or not finite", value) });
            }
        }
        Ok(())
    }
}

/// Runtime configuration that can be hot-reloaded during gameplay.
/// These are settings that don't affect the simulation (controls, debug).
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
pub struct GameConfig {
    // Controls (hot-reloadable)
    pub key_move_up: KeyCode,
    pub key_move_down: KeyCode,
    pub key_move_left: KeyCode,
    pub key_move_right: KeyCode,
    pub key_pause: KeyCode,
    pub key_debug_colliders: KeyCode,
    pub key_debug_flow: KeyCode,
    pub key_debug_grid: KeyCode,

    // Debug visualization (hot-reloadable)
    pub debug_flow_arrow_scale: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            key_move_up: KeyCode::KeyW,
            key_move_down: KeyCode::KeyS,
            key_move_left: KeyCode::KeyA,
            key_move_right: KeyCode::KeyD,
            key_pause: KeyCode::Escape,
            key_debug_colliders: KeyCode::F1,
            key_debug_flow: KeyCode::F2,
            key_debug_grid: KeyCode::F3,
            debug_flow_arrow_scale: 0.4,
        }
    }
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        // Loaded before Startup so simulation init can read it. The binary
        // inserts its own copy after reading the logging settings.
        if !app.world().contains_resource::<InitialConfig>() {
            app.insert_resource(load_initial_config(INITIAL_CONFIG_PATH));
        }
        app.add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
           .add_systems(Startup, setup_runtime_config);
    }
}

/// Load static initial configuration synchronously, falling back to defaults.
fn load_initial_config(path: &str) -> InitialConfig {
    match InitialConfig::load(path) {
        Ok(config) => {
            info!("Loaded initial config from {}", path);
            config
        }
        Err(e) => {
            error!("{}", e);
            error!("Using default InitialConfig");
            InitialConfig::default()
        }
    }
}

/// Load runtime configuration asynchronously (can be hot-reloaded).
fn setup_runtime_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            spatial_cell_size: 64.0,
            collision_parallel: true,
            flow_cell_size: 50.0,
            flow_side_width: 10,
            crowd_weight: 2,
            player_speed: 180.0,
            player_radius: 16.0,
            player_health: 10.0,
            player_regen_per_sec: 0.2,
            pursuer_speed: 70.0,
            pursuer_radius: 17.0,
            pursuer_health: 3.0,
            pursuer_drag: 2.0,
            max_steering_force: 400.0,
            neighbor_radius: 60.0,
            separation_radius: 40.0,
            separation_weight: 1.5,
            alignment_weight: 0.5,
            contact_damage: 1.0,
            invulnerability_secs: 0.3,
            knockback: 120.0,
            fire_interval_secs: 0.5,
            projectile_speed: 400.0,
            projectile_damage: 1.0,
            projectile_pierce: 2.0,
            projectile_lifetime_secs: 5.0,
            pickup_range: 100.0,
            pickup_speed: 300.0,
            xp_first_level: 5.0,
            xp_growth: 1.6,
            spawn_interval_secs: 0.5,
            spawn_radius: 500.0,
            spawn_batch: 1,
            max_pursuers: 400,
            wall_count: 12,
            wall_radius: 25.0,
            log_dir: "logs".to_string(),
            log_files_kept: 25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = InitialConfig::from_ron("(tick_rate: 30.0, spatial_cell_size: 80.0)").unwrap();
        assert_eq!(config.tick_rate, 30.0);
        assert_eq!(config.spatial_cell_size, 80.0);
        assert_eq!(config.flow_side_width, InitialConfig::default().flow_side_width);
    }

    #[test]
    fn test_rejects_non_positive_tick_rate() {
        let err = InitialConfig::from_ron("(tick_rate: 0.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tick_rate", .. }), "{}", err);
    }

    #[test]
    fn test_rejects_non_positive_spawn_interval() {
        for ron in ["(spawn_interval_secs: -1.0)", "(spawn_interval_secs: 0.0)", "(spawn_interval_secs: NaN)"] {
            let err = InitialConfig::from_ron(ron).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "spawn_interval_secs", .. }), "{}: {}", ron, err);
        }
    }

    #[test]
    fn test_rejects_bad_time_fields() {
        let err = InitialConfig::from_ron("(fire_interval_secs: inf)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "fire_interval_secs", .. }), "{}", err);

        let err = InitialConfig::from_ron("(projectile_lifetime_secs: 0.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "projectile_lifetime_secs", .. }), "{}", err);

        let err = InitialConfig::from_ron("(invulnerability_secs: -0.5)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "invulnerability_secs", .. }), "{}", err);

        // No immunity window at all is allowed.
        assert!(InitialConfig::from_ron("(invulnerability_secs: 0.0)").is_ok());
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config = InitialConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/initial_config.ron")).unwrap();
        assert!(config.log_files_kept > 0);
        assert!(!config.log_dir.is_empty());
    }

    #[test]
    fn test_rejects_impassable_crowd_weight() {
        let err = InitialConfig::from_ron("(crowd_weight: 255)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "crowd_weight", .. }));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = InitialConfig::load("does/not/exist.ron").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.ron"));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        assert!(matches!(InitialConfig::from_ron("(tick_rate: ").unwrap_err(), ConfigError::Parse { .. }));
    }
}
