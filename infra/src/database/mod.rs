//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and embedded migrations
//! - [`MySqlVerificationStore`] on the `phone_verifications` table

pub mod connection;
pub mod verification_store;


// Re-export commonly used types
pub use connection::DatabasePool;
pub use verification_store::MySqlVerificationStore;
