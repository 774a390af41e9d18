//! One-line `tracing-subscriber` setup, driven by an `AppConfig`-style
//! level string rather than `RUST_LOG`, so the CLI's `--log-level` flag and
//! a config file both end up going through the same initialization path.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber that writes to stderr at `level`
/// (`error`, `warn`, `info`, `debug`, `trace`). Falls back to `info` when
/// `level` isn't recognized. Safe to call more than once; later calls are
/// no-ops.
pub fn init(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
