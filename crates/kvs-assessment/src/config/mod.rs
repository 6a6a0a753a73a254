//! Service configuration.
//!
//! Loaded from the YAML file named by `KVS_CONFIG_PATH`. Missing or invalid
//! configuration is fatal at startup.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("config error: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub add_source: bool,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub service_version: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(rename = "type", default = "default_storage_type")]
    pub storage_type: String,
    pub connection: String,
}

fn default_storage_type() -> String {
    "postgres".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpEndpointConfig {
    pub port: u16,
    #[serde(default)]
    pub timeout: Option<String>,
}

impl HttpEndpointConfig {
    /// Request timeout; defaults to 30 s when unset or unparsable.
    pub fn request_timeout(&self) -> Duration {
        self.timeout
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(Duration::from_secs(30))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub public: HttpEndpointConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    pub subject: String,
    #[serde(default)]
    pub event_timeout: Option<String>,
}

impl NatsConfig {
    /// Upper bound for the detached result publish; defaults to 5 s.
    pub fn publish_timeout(&self) -> Duration {
        self.event_timeout
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(Duration::from_secs(5))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthServiceConfig {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub http: HttpConfig,
    pub nats: NatsConfig,
    pub auth_service: AuthServiceConfig,
}

impl AssessmentConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if path.is_empty() {
            return Err(ConfigError::Invalid("invalid path".to_string()));
        }

        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.connection.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.connection is empty".to_string(),
            ));
        }
        if self.http.public.port == 0 {
            return Err(ConfigError::Invalid("http.public.port not set".to_string()));
        }
        if self.nats.url.trim().is_empty() {
            return Err(ConfigError::Invalid("nats.url is empty".to_string()));
        }
        if self.nats.subject.trim().is_empty() {
            return Err(ConfigError::Invalid("nats.subject is empty".to_string()));
        }
        if self.auth_service.address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth_service.address is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses `"30s"`, `"500ms"`, `"10m"`, or a bare seconds number.
pub(crate) fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();

    if let Some(millis) = raw.strip_suffix("ms") {
        return millis.trim().parse().ok().map(Duration::from_millis);
    }
    if let Some(secs) = raw.strip_suffix('s') {
        return secs.trim().parse().ok().map(Duration::from_secs);
    }
    if let Some(mins) = raw.strip_suffix('m') {
        return mins
            .trim()
            .parse::<u64>()
            .ok()
            .map(|m| Duration::from_secs(m * 60));
    }

    raw.parse().ok().map(Duration::from_secs)
}
