//! Tracing initialization for the CLI
//!
//! Logs go to stderr so stdout carries only the accounts CSV. `RUST_LOG`
//! takes precedence over the level passed on the command line.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// An unparsable `level` falls back to `warn`. Safe to call more than once;
/// later calls are no-ops.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
