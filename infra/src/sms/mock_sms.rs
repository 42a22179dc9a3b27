//! Mock Provider Implementation
//!
//! Logs the code instead of sending it and hands out synthetic references.
//! It can be scripted to fail every send with a given failure class, which
//! makes fallback behaviour reproducible in development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use mazad_core::{CanonicalPhone, DeliveryStatus, FailureClass, ProviderAdapter, ProviderError};
use mazad_shared::utils::mask_phone_number;
use mazad_shared::Channel;

/// Prefix of every reference this provider returns
const REFERENCE_PREFIX: &str = "mock-";

/// Mock provider for development and testing
#[derive(Clone)]
pub struct MockProvider {
    id: String,
    /// Class reported on every send, if set
    fail_with: Option<FailureClass>,
    /// Counter for tracking number of messages accepted
    message_count: Arc<AtomicU64>,
}

impl MockProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fail_with: None,
            message_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Reject every send with `class`
    pub fn failing(id: impl Into<String>, class: FailureClass) -> Self {
        Self {
            fail_with: Some(class),
            ..Self::new(id)
        }
    }

    /// Build from the `fail_with` config value (a snake_case class name)
    pub fn from_config(id: impl Into<String>, fail_with: Option<&str>) -> Self {
        match fail_with {
            Some(name) => Self::failing(id, FailureClass::from_name(name)),
            None => Self::new(id),
        }
    }

    /// Get the total number of messages accepted
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, _channel: Channel) -> bool {
        true
    }

    async fn send(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        channel: Channel,
        sender: Option<&str>,
    ) -> Result<String, ProviderError> {
        if let Some(class) = &self.fail_with {
            warn!(
                provider = %self.id,
                phone = %mask_phone_number(phone.as_str()),
                class = %class,
                "Mock provider simulating failure"
            );
            return Err(ProviderError::new(class.clone(), "simulated failure"));
        }

        self.message_count.fetch_add(1, Ordering::SeqCst);
        let reference = format!("{}{}", REFERENCE_PREFIX, Uuid::new_v4());

        info!(
            provider = %self.id,
            channel = %channel,
            sender = sender.unwrap_or("default"),
            phone = %mask_phone_number(phone.as_str()),
            code = %code,
            reference = %reference,
            "[MOCK] Verification code dispatched"
        );

        Ok(reference)
    }

    async fn fetch_status(&self, provider_ref: &str) -> Result<DeliveryStatus, ProviderError> {
        if provider_ref.starts_with(REFERENCE_PREFIX) {
            Ok(DeliveryStatus::Delivered)
        } else {
            Err(ProviderError::unknown(
                "invalid_reference",
                format!("'{}' was not issued by this provider", provider_ref),
            ))
        }
    }
}
