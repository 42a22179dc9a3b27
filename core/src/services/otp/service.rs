//! Main OTP service implementation

use chrono::Utc;
use mazad_shared::utils::mask_phone_number;
use rand::{rngs::OsRng, Rng};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::{CanonicalPhone, DeliveryStatus, VerifyOutcome};
use crate::errors::{OtpError, OtpResult};
use crate::repositories::VerificationStore;
use crate::services::delivery::DeliveryRouter;
use crate::services::phone::PhoneNormalizer;

use super::config::OtpServiceConfig;
use super::types::SendReceipt;

/// Issues and verifies one-time codes for phone numbers
pub struct OtpService {
    normalizer: PhoneNormalizer,
    store: Arc<dyn VerificationStore>,
    router: Arc<DeliveryRouter>,
    config: OtpServiceConfig,
}

impl OtpService {
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `normalizer` - Numbering plan used for every phone comparison
    /// * `store` - Verification record persistence
    /// * `router` - Delivery across configured providers
    /// * `config` - Code length and TTL
    pub fn new(
        normalizer: PhoneNormalizer,
        store: Arc<dyn VerificationStore>,
        router: Arc<DeliveryRouter>,
        config: OtpServiceConfig,
    ) -> Self {
        Self {
            normalizer,
            store,
            router,
            config,
        }
    }

    /// Issue a fresh code for `raw_phone` and hand it to the router.
    ///
    /// Any outstanding code for the phone is replaced. If delivery fails on
    /// every candidate the stored code is kept; a later send overwrites it.
    ///
    /// # Returns
    ///
    /// * `Ok(SendReceipt)` - Canonical phone, expiry and delivery details
    /// * `Err(OtpError::InvalidPhone)` - Input is not a valid number
    /// * `Err(OtpError::StoreUnavailable)` - Code could not be stored
    /// * `Err(OtpError::AllChannelsFailed)` - No candidate accepted the message
    pub async fn send(&self, raw_phone: &str) -> OtpResult<SendReceipt> {
        let phone = self.canonicalize(raw_phone)?;
        let masked = mask_phone_number(phone.as_str());

        let code = Self::generate_code(self.config.code_length);
        let record = self
            .store
            .upsert(&phone, &code, self.config.code_ttl)
            .await
            .map_err(|e| {
                error!(
                    phone = %masked,
                    error = %e,
                    event = "otp_storage_failed",
                    "Failed to store verification code"
                );
                OtpError::from(e)
            })?;

        info!(
            phone = %masked,
            expires_at = %record.expires_at,
            event = "otp_generated",
            "Generated new verification code"
        );

        let delivery = self.router.deliver(&phone, &code).await?;

        Ok(SendReceipt {
            phone,
            expires_at: record.expires_at,
            delivery,
        })
    }

    /// Check `code` against the outstanding code for `raw_phone`
    ///
    /// # Returns
    ///
    /// * `Ok(VerifyOutcome)` - valid, invalid_code, expired, not_found or attempts_exceeded
    /// * `Err(OtpError::InvalidPhone)` - Input is not a valid number
    /// * `Err(OtpError::StoreUnavailable)` - Store could not be consulted
    pub async fn verify(&self, raw_phone: &str, code: &str) -> OtpResult<VerifyOutcome> {
        let phone = self.canonicalize(raw_phone)?;
        let masked = mask_phone_number(phone.as_str());

        let outcome = self
            .store
            .consume(&phone, code.trim(), Utc::now())
            .await
            .map_err(|e| {
                error!(
                    phone = %masked,
                    error = %e,
                    event = "otp_verification_error",
                    "Failed to consult verification store"
                );
                OtpError::from(e)
            })?;

        match outcome {
            VerifyOutcome::Valid => info!(
                phone = %masked,
                event = "otp_verified_success",
                "Verification code successfully verified"
            ),
            VerifyOutcome::AttemptsExceeded => warn!(
                phone = %masked,
                event = "max_attempts_exceeded",
                "Maximum verification attempts exceeded, code discarded"
            ),
            other => warn!(
                phone = %masked,
                outcome = %other,
                event = "otp_verification_failed",
                "Verification code not accepted"
            ),
        }

        Ok(outcome)
    }

    /// Upstream delivery state for a reference returned in a `SendReceipt`
    pub async fn delivery_status(&self, provider: &str, provider_ref: &str) -> OtpResult<DeliveryStatus> {
        self.router.fetch_status(provider, provider_ref).await
    }

    /// Generate a numeric code using OsRng (OS-provided CSPRNG)
    pub fn generate_code(length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    fn canonicalize(&self, raw_phone: &str) -> OtpResult<CanonicalPhone> {
        self.normalizer.normalize(raw_phone).ok_or_else(|| {
            warn!(
                phone = %mask_phone_number(raw_phone),
                event = "invalid_phone",
                "Rejected phone number"
            );
            OtpError::InvalidPhone {
                input: raw_phone.to_string(),
            }
        })
    }
}
