//! Provider adapter trait

use async_trait::async_trait;
use mazad_shared::Channel;

use crate::domain::{CanonicalPhone, DeliveryStatus};
use crate::errors::ProviderError;

/// An upstream provider that can deliver a code over one or more channels.
///
/// Implementations map their provider's error codes onto
/// [`FailureClass`](crate::errors::FailureClass) and do not retry internally;
/// fallback is the router's job.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Configured identifier referenced by routing rules
    fn id(&self) -> &str;

    /// Whether this adapter can send over `channel`
    fn supports(&self, channel: Channel) -> bool;

    /// Ask the upstream to deliver `code` to `phone`.
    ///
    /// `sender` overrides the adapter's default sender identity.
    ///
    /// # Returns
    /// * `Ok(String)` - Provider reference for later status lookups
    /// * `Err(ProviderError)` - Classified upstream failure
    async fn send(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        channel: Channel,
        sender: Option<&str>,
    ) -> Result<String, ProviderError>;

    /// Look up delivery state for a reference returned by `send`
    async fn fetch_status(&self, provider_ref: &str) -> Result<DeliveryStatus, ProviderError>;
}
