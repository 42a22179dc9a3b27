//! Result types for the OTP service

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{CanonicalPhone, DeliveryResult};

/// Outcome of a successful `send`
#[derive(Debug, Clone, Serialize)]
pub struct SendReceipt {
    pub phone: CanonicalPhone,
    pub expires_at: DateTime<Utc>,
    pub delivery: DeliveryResult,
}
