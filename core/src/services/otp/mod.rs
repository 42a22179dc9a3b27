//! OTP service module
//!
//! This module provides the verification code workflow:
//! - Code generation from the OS CSPRNG
//! - Storage with expiry through a `VerificationStore`
//! - Delivery through the `DeliveryRouter`
//! - Single-use verification with attempt lockout
//! - Background purge of expired codes

mod config;
mod service;
mod sweeper;
mod types;

#[cfg(test)]
mod tests;

pub use config::OtpServiceConfig;
pub use service::OtpService;
pub use sweeper::{ExpirySweeper, SweepResult};
pub use types::SendReceipt;
