//! Tracing setup shared by the `fittrack` binary and unit tests.
//!
//! Diagnostics always go to stderr so that command output on stdout can be
//! piped or asserted on. The filter comes from `FITTRACK_LOG`, then
//! `RUST_LOG`, then the level the caller asks for.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Env var checked before `RUST_LOG`
pub const LOG_ENV: &str = "FITTRACK_LOG";

/// Quiet by default: only warnings such as a corrupt record being set aside
pub fn init() {
    init_with_level("warn")
}

pub fn init_with_level(default_level: &str) {
    let directives = pick_directives(
        std::env::var(LOG_ENV).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        default_level,
    );
    // Unparseable directives fall back to the default level
    let filter =
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from an embedding program) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn pick_directives(app: Option<String>, rust_log: Option<String>, default_level: &str) -> String {
    [app, rust_log]
        .into_iter()
        .flatten()
        .map(|d| d.trim().to_string())
        .find(|d| !d.is_empty())
        .unwrap_or_else(|| default_level.to_string())
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
