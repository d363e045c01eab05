//! Configuration loading and validation tests
//!
//! Tests focus on observable outcomes of loading configuration files, not on
//! TOML parsing details.

use mqtt_runtime::config::{ClientConfig, ConfigError};
use mqtt_runtime::protocol::WireEncoder;
use mqtt_runtime::testing::{MockController, MockTimerService};
use mqtt_runtime::transport::LivenessMonitor;
use mqtt_runtime::ClientError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "{content}").unwrap();
    temp_file
}

#[test]
fn test_config_loads_successfully_from_valid_toml() {
    let temp_file = write_config(
        r#"
[connection]
broker_url = "wss://broker.example.com/mqtt"
client_id = "sensor-17"
keep_alive_interval_secs = 30

[logging]
level = "debug"
format = "compact"
spans = true
"#,
    );

    let config = ClientConfig::load_from_file(temp_file.path()).unwrap();

    assert_eq!(config.connection.broker_url, "wss://broker.example.com/mqtt");
    assert_eq!(config.connection.client_id.as_deref(), Some("sensor-17"));
    assert_eq!(config.connection.keep_alive_interval_secs, 30);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "compact");
    assert!(config.logging.spans);
}

#[test]
fn test_missing_file_is_read_error() {
    let result = ClientConfig::load_from_file(Path::new("/nonexistent/mqtt-runtime.toml"));
    assert!(matches!(result, Err(ConfigError::FileRead(_))));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let temp_file = write_config("[connection\nbroker_url = ");
    let result = ClientConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_missing_connection_section_is_rejected() {
    let temp_file = write_config("[logging]\nlevel = \"info\"");
    assert!(ClientConfig::load_from_file(temp_file.path()).is_err());
}

#[test]
fn test_invalid_client_id_is_rejected() {
    let temp_file = write_config(
        r#"
[connection]
broker_url = "mqtt://localhost:1883"
client_id = "bad id"
"#,
    );
    let result = ClientConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::InvalidClientId(_))));
}

#[test]
fn test_unsupported_scheme_is_rejected() {
    let temp_file = write_config(
        r#"
[connection]
broker_url = "ftp://localhost"
"#,
    );
    let result = ClientConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::InvalidBrokerUrl(_))));
}

#[test]
fn test_config_error_converts_to_client_error() {
    let err = ClientConfig::from_toml_str("[connection]\nbroker_url = \"nope\"").unwrap_err();
    let client_error: ClientError = err.into();
    assert!(client_error.to_string().starts_with("Configuration error:"));
}

#[test]
fn test_keep_alive_from_config_drives_monitor() {
    let config = ClientConfig::from_toml_str(
        r#"
[connection]
broker_url = "ws://localhost:8080/mqtt"
keep_alive_interval_secs = 0
"#,
    )
    .unwrap();

    let timers = Arc::new(MockTimerService::new());
    let controller = Arc::new(MockController::new());
    let monitor = LivenessMonitor::with_interval(
        config.connection.keep_alive_interval(),
        &WireEncoder,
        timers.clone(),
        &controller,
    );

    assert!(!monitor.is_enabled());
    monitor.reset();
    assert_eq!(timers.pending_count(), 0);
}
