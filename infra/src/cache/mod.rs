//! Cache module for Redis-backed verification storage
//!
//! Provides a managed Redis connection with startup retries and the
//! [`RedisVerificationStore`] whose mutations run as Lua scripts.

pub mod redis_client;
pub mod verification_store;


pub use redis_client::RedisClient;
pub use verification_store::RedisVerificationStore;

// Re-export commonly used types
pub use mazad_shared::CacheConfig;
