//! Structured logging setup.
//!
//! Installs a global `tracing` subscriber built from [`LoggingConfig`].
//! `RUST_LOG` takes precedence over the configured level when set.

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// # Errors
/// Returns `ProtocolError::ConfigError` if the configuration is invalid or a
/// global subscriber has already been installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ProtocolError::ConfigError(errors.join("; ")));
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.as_str()))
        .map_err(|e| ProtocolError::ConfigError(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.with_ansi(config.ansi).try_init()
    };
    installed.map_err(|e| ProtocolError::ConfigError(e.to_string()))?;

    tracing::info!(app = %config.app_name, level = %config.log_level, "logging initialized");
    Ok(())
}
