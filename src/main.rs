use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use horde::game::config::{ConfigError, InitialConfig, INITIAL_CONFIG_PATH};
use horde::game::GamePlugin;

const LOG_PREFIX: &str = "horde_";
const DEFAULT_FILTER: &str = "wgpu=error,bevy_render=info,bevy_ecs=info,horde=info";

/// An open run log. Dropping the guard flushes the background writer.
struct RunLog {
    path: PathBuf,
    _guard: WorkerGuard,
}

/// Installs the global subscriber: stdout plus one file per run in `dir`.
///
/// Older run logs beyond `keep` (counting the new one) are removed first.
fn init_logging(dir: &Path, keep: usize) -> io::Result<RunLog> {
    fs::create_dir_all(dir)?;
    if let Err(err) = prune_run_logs(dir, keep.saturating_sub(1)) {
        eprintln!("Could not prune old logs in '{}': {}", dir.display(), err);
    }

    let file_name = format!("{}{}.log", LOG_PREFIX, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, &file_name));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(fmt::layer().with_writer(io::stdout).with_target(false))
        .init();

    Ok(RunLog { path: dir.join(file_name), _guard: guard })
}

/// Timestamped names sort chronologically, so the oldest come first.
fn prune_run_logs(dir: &Path, keep: usize) -> io::Result<()> {
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_PREFIX) && name.ends_with(".log"))
        })
        .collect();
    logs.sort();

    let excess = logs.len().saturating_sub(keep);
    for stale in &logs[..excess] {
        fs::remove_file(stale)?;
    }
    Ok(())
}

fn main() {
    // Read before logging exists; a failure is reported once the subscriber is up.
    let (config, config_error): (InitialConfig, Option<ConfigError>) = match InitialConfig::load(INITIAL_CONFIG_PATH) {
        Ok(config) => (config, None),
        Err(err) => (InitialConfig::default(), Some(err)),
    };

    let run_log = match init_logging(Path::new(&config.log_dir), config.log_files_kept) {
        Ok(run_log) => run_log,
        Err(err) => {
            eprintln!("Could not set up logging in '{}': {}", config.log_dir, err);
            std::process::exit(1);
        }
    };

    if let Some(err) = config_error {
        error!("[CONFIG] {}", err);
        error!("[CONFIG] Using default InitialConfig");
    } else {
        info!("[CONFIG] Loaded initial config from {}", INITIAL_CONFIG_PATH);
    }
    info!("[MAIN] Logging to {}", run_log.path.display());

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Horde".into(),
                        resolution: WindowResolution::new(1280, 720),
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .build()
                .disable::<LogPlugin>(),
        )
        .insert_resource(config)
        .add_plugins(GamePlugin)
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_newest_run_logs_only() {
        let dir = std::env::temp_dir().join(format!("horde_prune_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for stamp in ["20240101_000000", "20240102_000000", "20240103_000000"] {
            fs::write(dir.join(format!("{}{}.log", LOG_PREFIX, stamp)), "").unwrap();
        }
        fs::write(dir.join("notes.log"), "").unwrap();

        prune_run_logs(&dir, 2).unwrap();

        let mut left: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(left, vec!["horde_20240102_000000.log", "horde_20240103_000000.log", "notes.log"]);
    }
}
