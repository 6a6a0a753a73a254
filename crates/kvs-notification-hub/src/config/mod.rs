//! Service configuration.
//!
//! Loaded from the YAML file named by `HUB_CONFIG_PATH`. Missing or
//! invalid configuration is fatal at startup.

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
pub struct NatsConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Sender address; also the SMTP login.
    pub from: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthServiceConfig {
    /// Base URL of the auth service contacts endpoint.
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    pub logging: LoggingConfig,
    pub nats: NatsConfig,
    pub smtp: SmtpConfig,
    pub auth_service: AuthServiceConfig,
}

impl HubConfig {
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
        if self.nats.url.trim().is_empty() {
            return Err(ConfigError::Invalid("nats.url is empty".to_string()));
        }
        if self.smtp.host.trim().is_empty() {
            return Err(ConfigError::Invalid("smtp.host is empty".to_string()));
        }
        if self.smtp.port == 0 {
            return Err(ConfigError::Invalid("smtp.port not set".to_string()));
        }
        if self.smtp.from.trim().is_empty() {
            return Err(ConfigError::Invalid("smtp.from is empty".to_string()));
        }
        if self.auth_service.address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth_service.address is empty".to_string(),
            ));
        }
        Ok(())
    }
}
