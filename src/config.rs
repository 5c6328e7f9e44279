//! # Configuration Management
//!
//! Protocol constants and the configuration used when the protocol is
//! registered with a service registry.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! The codec itself is stateless and reads nothing from here at runtime; the
//! configuration only decides how the protocol service is advertised and how
//! logging is set up.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Magic marker carried in the `sync` field of every envelope
pub const SYNC_MAGIC: u32 = 0xABBA_BAAB;

/// Declared wire header size reported to transports for framing allocation
pub const HEADER_SIZE: usize = 52;

/// Protocol-type identifier this protocol is registered under
pub const PROTOCOL_TYPE: &str = "sut_wire_protocol_headerless";

/// Service name shared by every pub/sub protocol service
pub const PROTOCOL_SERVICE_NAME: &str = "pubsub_protocol";

/// Property key holding the protocol-type identifier
pub const PROTOCOL_TYPE_KEY: &str = "pubsub.protocol.type";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProtocolConfig {
    /// Service registration settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProtocolConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(protocol_type) = std::env::var("HEADERLESS_WIRE_PROTOCOL_TYPE") {
            config.service.protocol_type = protocol_type;
        }

        if let Ok(service_name) = std::env::var("HEADERLESS_WIRE_SERVICE_NAME") {
            config.service.service_name = service_name;
        }

        if let Ok(level) = std::env::var("HEADERLESS_WIRE_LOG_LEVEL") {
            config.logging.log_level = level.parse::<Level>().map_err(|_| {
                ProtocolError::ConfigError(format!("Invalid log level: {level}"))
            })?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.service.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// How the protocol service is advertised in the registry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Value stored under [`PROTOCOL_TYPE_KEY`]
    pub protocol_type: String,

    /// Name the service is registered under
    pub service_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            protocol_type: String::from(PROTOCOL_TYPE),
            service_name: String::from(PROTOCOL_SERVICE_NAME),
        }
    }
}

impl ServiceConfig {
    /// Validate service configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.protocol_type.is_empty() {
            errors.push("Protocol type cannot be empty".to_string());
        } else if self.protocol_type.chars().any(char::is_whitespace) {
            errors.push(format!(
                "Protocol type must not contain whitespace: '{}'",
                self.protocol_type
            ));
        }

        if self.service_name.is_empty() {
            errors.push("Service name cannot be empty".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,

    /// Whether to emit ANSI colours (plain format only)
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("headerless-wire"),
            log_level: Level::INFO,
            json_format: false,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.json_format && self.ansi {
            errors.push("ANSI colours are not supported with JSON formatting".to_string());
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
