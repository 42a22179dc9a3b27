//! Business services: normalization, delivery routing and the OTP façade.

pub mod delivery;
pub mod otp;
pub mod phone;

// Re-export commonly used types
pub use delivery::{DeliveryRouter, ProviderAdapter, RouteCandidate, RoutingTable};
pub use otp::{ExpirySweeper, OtpService, OtpServiceConfig, SendReceipt, SweepResult};
pub use phone::PhoneNormalizer;
