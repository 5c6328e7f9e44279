//! Integration tests for configuration loading and validation

#![allow(clippy::expect_used)]

use headerless_wire::config::{
    LoggingConfig, ProtocolConfig, ServiceConfig, PROTOCOL_SERVICE_NAME, PROTOCOL_TYPE,
};
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = ProtocolConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
    assert_eq!(config.service.protocol_type, PROTOCOL_TYPE);
    assert_eq!(config.service.service_name, PROTOCOL_SERVICE_NAME);
}

#[test]
fn test_empty_protocol_type() {
    let mut config = ProtocolConfig::default();
    config.service.protocol_type = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Protocol type cannot be empty")));
}

#[test]
fn test_whitespace_protocol_type() {
    let mut config = ProtocolConfig::default();
    config.service.protocol_type = "wire protocol".to_string();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("must not contain whitespace")));
}

#[test]
fn test_empty_service_name() {
    let mut config = ProtocolConfig::default();
    config.service.service_name = String::new();

    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Service name cannot be empty")));
}

#[test]
fn test_long_app_name() {
    let mut config = ProtocolConfig::default();
    config.logging.app_name = "a".repeat(65);

    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Application name too long")));
}

#[test]
fn test_json_with_ansi_rejected() {
    let config = ProtocolConfig::default_with_overrides(|c| {
        c.logging.json_format = true;
        c.logging.ansi = true;
    });

    assert!(config.validate_strict().is_err());
}

#[test]
fn test_multiple_errors_reported() {
    let config = ProtocolConfig {
        service: ServiceConfig {
            protocol_type: String::new(),
            service_name: String::new(),
        },
        logging: LoggingConfig {
            app_name: String::new(),
            ..LoggingConfig::default()
        },
    };

    assert_eq!(config.validate().len(), 3);
    let err = config.validate_strict().expect_err("should fail");
    assert!(err.to_string().contains("Configuration validation failed"));
}

#[test]
fn test_from_toml() {
    let config = ProtocolConfig::from_toml(
        r#"
        [service]
        protocol_type = "custom_wire"
        service_name = "pubsub_protocol"

        [logging]
        app_name = "subscriber"
        log_level = "debug"
        json_format = true
        ansi = false
        "#,
    )
    .expect("valid TOML");

    assert_eq!(config.service.protocol_type, "custom_wire");
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.validate().is_empty());
}

#[test]
fn test_from_toml_defaults_missing_sections() {
    let config = ProtocolConfig::from_toml("").expect("empty TOML uses defaults");
    assert_eq!(config.service.protocol_type, PROTOCOL_TYPE);
}

#[test]
fn test_from_toml_bad_log_level() {
    let result = ProtocolConfig::from_toml(
        r#"
        [logging]
        app_name = "x"
        log_level = "loud"
        json_format = false
        ansi = false
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("wire.toml");

    let config = ProtocolConfig::default_with_overrides(|c| {
        c.service.protocol_type = "saved_wire".to_string();
        c.logging.log_level = Level::WARN;
    });
    config.save_to_file(&path).expect("save");

    let loaded = ProtocolConfig::from_file(&path).expect("load");
    assert_eq!(loaded.service.protocol_type, "saved_wire");
    assert_eq!(loaded.logging.log_level, Level::WARN);
}

#[test]
fn test_missing_file() {
    assert!(ProtocolConfig::from_file("/nonexistent/wire.toml").is_err());
}

#[test]
fn test_example_config_parses() {
    let example = ProtocolConfig::example_config();
    assert!(example.contains("protocol_type"));
    ProtocolConfig::from_toml(&example).expect("example config should parse");
}

#[test]
fn test_from_env_defaults() {
    // only reads variables; unset ones keep defaults
    let config = ProtocolConfig::from_env().expect("env config");
    assert!(!config.service.protocol_type.is_empty());
}
