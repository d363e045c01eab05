//! Client configuration loaded from TOML
//!
//! ```toml
//! [connection]
//! broker_url = "ws://localhost:8080/mqtt"
//! client_id = "sensor-17"
//! keep_alive_interval_secs = 60
//!
//! [logging]
//! level = "info"
//! format = "json"
//! spans = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Schemes a client can connect over
pub const SUPPORTED_SCHEMES: [&str; 4] = ["ws", "wss", "mqtt", "mqtts"];

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub connection: ConnectionSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Connection section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionSection {
    /// Broker URL with scheme, host and optional port/path
    pub broker_url: String,
    /// Client identifier; generated when absent
    pub client_id: Option<String>,
    /// Keep-alive interval in seconds; 0 disables liveness probing
    #[serde(default = "default_keep_alive_interval")]
    pub keep_alive_interval_secs: u64,
}

fn default_keep_alive_interval() -> u64 {
    60
}

impl ConnectionSection {
    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_interval_secs)
    }

    /// Configured client id, or a freshly generated one
    pub fn client_id_or_generate(&self) -> String {
        self.client_id
            .clone()
            .unwrap_or_else(|| format!("mqttrt-{}", Uuid::new_v4().simple()))
    }
}

/// Logging section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub spans: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            spans: false,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid broker URL: {0}")]
    InvalidBrokerUrl(String),
    #[error("Invalid client ID format: {0}")]
    InvalidClientId(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_broker_url(&self.connection.broker_url)?;
        if let Some(client_id) = &self.connection.client_id {
            validate_client_id(client_id)?;
        }
        // MQTT carries keep-alive in a 16-bit field
        if self.connection.keep_alive_interval_secs > u64::from(u16::MAX) {
            return Err(ConfigError::InvalidConfig(format!(
                "keep_alive_interval_secs {} exceeds {}",
                self.connection.keep_alive_interval_secs,
                u16::MAX
            )));
        }
        Ok(())
    }
}

fn validate_broker_url(broker_url: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(broker_url).map_err(|_| ConfigError::InvalidBrokerUrl(broker_url.to_string()))?;

    if !SUPPORTED_SCHEMES.contains(&url.scheme()) || url.host_str().is_none() {
        return Err(ConfigError::InvalidBrokerUrl(broker_url.to_string()));
    }
    Ok(())
}

fn validate_client_id(client_id: &str) -> Result<(), ConfigError> {
    let valid_chars = client_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');

    if client_id.is_empty() || !valid_chars {
        return Err(ConfigError::InvalidClientId(format!(
            "Client ID '{client_id}' must match pattern [a-zA-Z0-9._-]+"
        )));
    }
    Ok(())
}
