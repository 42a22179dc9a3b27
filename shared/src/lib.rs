//! Shared utilities and common types for the Mazad server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types and layered loading
//! - The delivery `Channel` shared by routing configuration and the domain
//! - API response envelope
//! - Utility functions (phone masking for logs)

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, LoggingConfig, OtpConfig,
    ProviderConfig, ProviderKind, RouteEntry, RoutingConfig, ServerConfig, StoreBackend,
    StoreConfig,
};
pub use types::{ApiResponse, Channel, ErrorBody};
pub use utils::phone;
