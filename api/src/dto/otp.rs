use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use mazad_core::{DeliveryAttempt, SendReceipt, VerifyOutcome};
use mazad_shared::Channel;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[validate(length(min = 1, max = 32, message = "phone must be 1-32 characters"))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(length(min = 1, max = 32, message = "phone must be 1-32 characters"))]
    pub phone: String,
    #[validate(length(min = 1, max = 12, message = "code must be 1-12 characters"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOtpResponse {
    /// Canonical form of the submitted number
    pub phone: String,
    pub expires_at: DateTime<Utc>,
    /// Provider that accepted the message
    pub provider: String,
    pub channel: Channel,
    /// Every attempt in order, including failed ones before the acceptance
    pub attempts: Vec<DeliveryAttempt>,
}

impl From<SendReceipt> for SendOtpResponse {
    fn from(receipt: SendReceipt) -> Self {
        Self {
            phone: receipt.phone.to_string(),
            expires_at: receipt.expires_at,
            provider: receipt.delivery.provider,
            channel: receipt.delivery.channel,
            attempts: receipt.delivery.attempts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpResponse {
    pub verified: bool,
    pub outcome: VerifyOutcome,
}
