//! # Mazad Core
//!
//! Phone OTP verification domain for the Mazad backend.
//! This crate contains the canonical phone type and its normalizer, the
//! verification store interface, delivery routing across upstream providers,
//! and the `OtpService` façade that ties them together.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    AttemptOutcome, CanonicalPhone, DeliveryAttempt, DeliveryResult, DeliveryStatus,
    VerificationRecord, VerifyOutcome,
};
pub use errors::{FailureClass, OtpError, OtpResult, ProviderError, StoreError};
pub use repositories::{InMemoryVerificationStore, VerificationStore};
pub use services::{
    DeliveryRouter, ExpirySweeper, OtpService, OtpServiceConfig, PhoneNormalizer,
    ProviderAdapter, RouteCandidate, RoutingTable, SendReceipt, SweepResult,
};
