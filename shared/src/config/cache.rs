//! Cache configuration module

use serde::{Deserialize, Serialize};

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Maximum connection attempts at startup
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Cache key prefix
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connection_timeout: default_connection_timeout(),
            max_retries: default_max_retries(),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_url() -> String {
    String::from("redis://localhost:6379")
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_max_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_key() {
        let config = CacheConfig::default();
        assert_eq!(config.make_key("otp:+964"), "otp:+964");

        let config = CacheConfig::new("redis://cache:6379").with_prefix("mazad");
        assert_eq!(config.make_key("otp:+964"), "mazad:otp:+964");
        assert_eq!(config.url, "redis://cache:6379");
    }
}
