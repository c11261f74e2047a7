//! Tracing subscriber for the `an` binary.
//!
//! Events go to stderr so stdout stays clean for reports and CSV output.
//! `RUST_LOG` overrides the default `info` level.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
