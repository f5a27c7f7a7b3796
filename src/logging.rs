//! Logging setup
//!
//! The crate logs through `tracing`; embedding applications that do not
//! install their own subscriber can call [`init`] to get a sensible
//! default (env-filtered, compact format).

use tracing_subscriber::EnvFilter;

/// Install a default tracing subscriber
///
/// Respects `RUST_LOG`; defaults to `info` when unset. Calling this twice
/// (or alongside another subscriber) is harmless: the second install is
/// ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
