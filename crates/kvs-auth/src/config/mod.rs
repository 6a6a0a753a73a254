//! Service configuration.
//!
//! Loaded from the YAML file named by `AUTH_CONFIG_PATH`. Missing or
//! invalid configuration is fatal at startup.

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
pub struct EndpointConfig {
    pub port: u16,
    #[serde(default)]
    pub timeout: Option<String>,
}

impl EndpointConfig {
    pub fn request_timeout(&self) -> Duration {
        self.timeout
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(Duration::from_secs(30))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub public: EndpointConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrpcConfig {
    pub private: EndpointConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default)]
    pub aud: Vec<String>,
    pub iss: String,
    /// Token validity period, e.g. `"60m"`.
    pub ttl: String,
}

impl JwtConfig {
    pub fn token_ttl(&self) -> Option<Duration> {
        parse_duration(&self.ttl)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub http: HttpConfig,
    pub grpc: GrpcConfig,
    pub jwt: JwtConfig,
}

impl AuthConfig {
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
        if self.grpc.private.port == 0 {
            return Err(ConfigError::Invalid(
                "grpc.private.port not set".to_string(),
            ));
        }
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Invalid("jwt.secret not set".to_string()));
        }
        if self.jwt.iss.is_empty() {
            return Err(ConfigError::Invalid("jwt.iss not set".to_string()));
        }
        if self.jwt.token_ttl().is_none() {
            return Err(ConfigError::Invalid("jwt.ttl is invalid".to_string()));
        }
        Ok(())
    }
}

/// Parses `"30s"`, `"500ms"`, `"10m"`, or a bare seconds number.
fn parse_duration(raw: &str) -> Option<Duration> {
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
