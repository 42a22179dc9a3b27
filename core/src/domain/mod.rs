//! Domain types for phone verification and code delivery.

pub mod delivery;
pub mod phone;
pub mod verification;

// Re-export commonly used domain types
pub use delivery::{AttemptOutcome, DeliveryAttempt, DeliveryResult, DeliveryStatus};
pub use phone::CanonicalPhone;
pub use verification::{VerificationRecord, VerifyOutcome};
