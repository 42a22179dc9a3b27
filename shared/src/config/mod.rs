//! Configuration module
//!
//! Settings are layered with the `config` crate:
//! - `config/default.toml`
//! - `config/<environment>.toml`
//! - `MAZAD__*` environment variables (`__` separates nesting levels)
//!
//! Sub-modules:
//! - `otp` - Normalization, code and sweep settings
//! - `providers` - Upstream delivery providers
//! - `routing` - Per-prefix delivery candidates
//! - `store` - Verification store backend (`cache`, `database`)
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod cache;
pub mod database;
pub mod environment;
pub mod otp;
pub mod providers;
pub mod routing;
pub mod server;
pub mod store;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use providers::{ProviderConfig, ProviderKind};
pub use routing::{RouteEntry, RoutingConfig};
pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub otp: OtpConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the environment named by `ENVIRONMENT`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_for(Environment::from_env())
    }

    /// Load `.env` files, config files and `MAZAD__*` overrides for `env`
    pub fn load_for(env: Environment) -> Result<Self, ConfigError> {
        // Missing .env files are normal outside development
        dotenvy::from_filename(env.env_file()).ok();
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("environment", env.to_string())?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&env.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix("MAZAD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = settings.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Parse a TOML document without consulting files or the environment
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        let app_config: AppConfig = settings.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Cross-section checks: value ranges, unique provider ids, routing references
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.otp.validate().map_err(ConfigError::Invalid)?;
        self.store.validate().map_err(ConfigError::Invalid)?;
        self.routing.validate().map_err(ConfigError::Invalid)?;

        let mut ids = HashSet::new();
        for provider in &self.providers {
            if !ids.insert(provider.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate provider id '{}'",
                    provider.id
                )));
            }
        }

        for entry in self.routing.entries() {
            if !ids.contains(entry.provider.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "routing references unknown provider '{}'",
                    entry.provider
                )));
            }
        }

        Ok(())
    }

    /// Find a provider by its identifier
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Channel;

    const SAMPLE: &str = r#"
environment = "staging"

[otp]
code_length = 4
max_attempts = 3

[store]
backend = "redis"

[store.redis]
url = "redis://cache:6379"
key_prefix = "mazad"

[[providers]]
id = "twilio-verify"
kind = "twilio_verify"
service_sid = "VA123"

[[providers]]
id = "twilio-wa"
kind = "twilio_messaging"
whatsapp_from = "+15550001111"

[[providers]]
id = "mock"
kind = "mock"
fail_with = "geo_permission_denied"

[[routing.default]]
provider = "twilio-verify"
channel = "sms"

[[routing.countries.964]]
provider = "twilio-verify"
channel = "sms"
sender = "VA999"

[[routing.countries.964]]
provider = "twilio-wa"
channel = "whatsapp"
allow_list = ["+9647701234567"]
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.otp.code_length, 4);
        assert_eq!(config.otp.max_attempts, 3);
        assert_eq!(config.otp.country_code, "964");
        assert_eq!(config.store.backend, StoreBackend::Redis);
        assert_eq!(config.store.redis.make_key("otp"), "mazad:otp");
        assert_eq!(config.providers.len(), 3);

        match &config.provider("twilio-verify").unwrap().kind {
            ProviderKind::TwilioVerify { service_sid, .. } => assert_eq!(service_sid, "VA123"),
            other => panic!("unexpected kind {}", other.name()),
        }
        match &config.provider("twilio-wa").unwrap().kind {
            ProviderKind::TwilioMessaging { template, .. } => assert!(template.contains("{code}")),
            other => panic!("unexpected kind {}", other.name()),
        }

        let country = &config.routing.countries["964"];
        assert_eq!(country.len(), 2);
        assert_eq!(country[0].sender.as_deref(), Some("VA999"));
        assert_eq!(country[1].channel, Channel::Whatsapp);
        assert_eq!(country[1].allow_list, vec!["+9647701234567"]);
    }

    #[test]
    fn test_unknown_provider_in_routing_is_rejected() {
        let toml = r#"
[[providers]]
id = "mock"
kind = "mock"

[[routing.default]]
provider = "missing"
channel = "sms"
"#;
        let err = AppConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("missing")));
    }

    #[test]
    fn test_zero_retention_is_rejected() {
        let toml = r#"
[store]
expired_retention_secs = 0
"#;
        let err = AppConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("expired_retention_secs")));
    }

    #[test]
    fn test_duplicate_provider_ids_are_rejected() {
        let toml = r#"
[[providers]]
id = "mock"
kind = "mock"

[[providers]]
id = "mock"
kind = "mock"

[[routing.default]]
provider = "mock"
"#;
        assert!(matches!(
            AppConfig::from_toml_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }
}
