//! Repository interfaces and in-process implementations.

pub mod verification;

pub use verification::{InMemoryVerificationStore, VerificationStore};
