//! # Infrastructure Layer
//!
//! Concrete implementations of the `mazad_core` seams:
//! - **Cache**: Redis-backed [`VerificationStore`](mazad_core::VerificationStore)
//! - **Database**: MySQL-backed verification store using SQLx
//! - **SMS**: provider adapters (Twilio Verify, Twilio Messaging, AWS SNS, mock)
//! - **Bootstrap**: assembles the OTP service from [`AppConfig`](mazad_shared::AppConfig)
//!
//! ## Features
//!
//! - `mysql`: Enable the MySQL verification store (default)
//! - `redis-cache`: Enable the Redis verification store (default)
//! - `aws-sns`: Enable the AWS SNS provider adapter (default)

use mazad_core::OtpError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// SMS module - upstream provider adapters
pub mod sms;

/// Cache module - Redis client and verification store
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Wiring of stores, adapters and the OTP service
pub mod bootstrap;

pub use bootstrap::{build_adapters, build_otp_runtime, build_store, OtpRuntime};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[cfg(feature = "mysql")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised while assembling core services
    #[error(transparent)]
    Otp(#[from] OtpError),
}
