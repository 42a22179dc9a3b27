//! Verification store backend configuration

use super::{CacheConfig, DatabaseConfig};
use serde::{Deserialize, Serialize};

/// Longest accepted retention for expired records (30 days)
pub const MAX_EXPIRED_RETENTION_SECS: u64 = 30 * 86_400;

/// Storage backend for verification records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
    Mysql,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default)]
    pub redis: CacheConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// How long an expired record is kept so it reports `expired` rather than `not_found`
    #[serde(default = "default_expired_retention_secs")]
    pub expired_retention_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redis: CacheConfig::default(),
            database: DatabaseConfig::default(),
            expired_retention_secs: default_expired_retention_secs(),
        }
    }
}

impl StoreConfig {
    /// A zero retention would drop records at the moment they expire
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_EXPIRED_RETENTION_SECS).contains(&self.expired_retention_secs) {
            return Err(format!(
                "store.expired_retention_secs must be 1..={}, got {}",
                MAX_EXPIRED_RETENTION_SECS, self.expired_retention_secs
            ));
        }
        Ok(())
    }

    /// Retention window as a signed duration, within the validated range
    pub fn expired_retention(&self) -> chrono::Duration {
        let secs = self.expired_retention_secs.min(MAX_EXPIRED_RETENTION_SECS);
        chrono::Duration::seconds(secs as i64)
    }
}

fn default_expired_retention_secs() -> u64 {
    86_400
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retention_is_valid() {
        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.expired_retention(), chrono::Duration::days(1));
    }

    #[test]
    fn test_retention_bounds() {
        let zero = StoreConfig {
            expired_retention_secs: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let huge = StoreConfig {
            expired_retention_secs: u64::MAX,
            ..Default::default()
        };
        assert!(huge.validate().is_err());
        assert_eq!(huge.expired_retention(), chrono::Duration::days(30));
    }
}
