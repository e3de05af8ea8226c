//! Logging setup.

use tcrflow_core::FlowError;
use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` overrides `default_level` when set.
///
/// # Errors
///
/// Returns [`FlowError::Configuration`] if a global subscriber is already
/// installed.
pub fn init(default_level: &str) -> Result<(), FlowError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| FlowError::Configuration(format!("logging already initialized: {}", e)))
}
