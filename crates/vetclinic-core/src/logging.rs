//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `filter`.
///
/// Falls back to `info` when the directive does not parse. Returns false if a
/// global subscriber was already installed, which makes repeat calls harmless.
pub fn init(filter: &str) -> bool {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
