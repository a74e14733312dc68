pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Logs every 100th simulation tick when the `perf_stats` feature is enabled.
///
/// Without the feature this expands to nothing and the arguments are never
/// evaluated, so it is safe to pass counts that walk a query.
///
/// ```ignore
/// profile_log!(tick, "[GRID] {} bodies in {} cells", grid.0.len(), grid.0.occupied_len());
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick.0 % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
