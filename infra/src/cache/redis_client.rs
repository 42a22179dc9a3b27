//! Redis client with connection management and retry logic
//!
//! Wraps a [`ConnectionManager`], which multiplexes commands over one
//! connection and reconnects after it drops. Startup connects with
//! exponential backoff so a Redis that is still booting does not abort the
//! service.

use redis::{aio::ConnectionManager, Client};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use mazad_shared::CacheConfig;

use crate::InfrastructureError;

/// Base delay between connection attempts
const RETRY_DELAY_MS: u64 = 100;

/// Upper bound for the backoff delay
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Redis client shared by cache-backed components
#[derive(Clone)]
pub struct RedisClient {
    /// Managed connection; clones share the socket
    connection: ConnectionManager,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect to Redis, retrying up to `config.max_retries` times
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    pub async fn connect(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::connect_with_retry(client, &config).await?;
        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    async fn connect_with_retry(
        client: Client,
        config: &CacheConfig,
    ) -> Result<ConnectionManager, InfrastructureError> {
        let max_retries = config.max_retries.max(1);
        let per_attempt = Duration::from_secs(config.connection_timeout.max(1));
        let mut attempts = 0;
        let mut delay = RETRY_DELAY_MS;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = match timeout(per_attempt, ConnectionManager::new(client.clone())).await {
                Ok(result) => result,
                Err(_) => Err(redis::RedisError::from(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "timed out connecting to Redis",
                ))),
            };

            match result {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// A handle to the managed connection
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    /// Prefix `key` with the configured namespace
    pub fn make_key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Round-trip a PING
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

/// Hide credentials embedded in a Redis URL
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
