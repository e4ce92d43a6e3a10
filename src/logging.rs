use tracing_subscriber::EnvFilter;

use crate::extension::ExtensionError;

/// Installs the global fmt subscriber. `RUST_LOG` takes precedence over
/// `default_filter`. Fails if a subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), ExtensionError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| ExtensionError::configuration(format!("Invalid log filter '{}': {}", default_filter, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| ExtensionError::configuration(format!("Failed to install tracing subscriber: {}", e)))
}
