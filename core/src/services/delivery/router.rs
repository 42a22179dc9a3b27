//! Delivery router: ordered fallback across routing candidates

use mazad_shared::utils::mask_phone_number;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::domain::{CanonicalPhone, DeliveryAttempt, DeliveryResult, DeliveryStatus};
use crate::errors::{OtpError, OtpResult, ProviderError};

use super::routing::{RouteCandidate, RoutingTable};
use super::traits::ProviderAdapter;

/// Drives delivery of a code through the candidates the routing table yields
pub struct DeliveryRouter {
    table: RoutingTable,
    providers: HashMap<String, Arc<dyn ProviderAdapter>>,
    timeout: Duration,
}

impl DeliveryRouter {
    /// Create a router, checking that every candidate names a registered
    /// provider able to serve its channel
    pub fn new(
        table: RoutingTable,
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        timeout: Duration,
    ) -> OtpResult<Self> {
        let mut providers: HashMap<String, Arc<dyn ProviderAdapter>> = HashMap::new();
        for adapter in adapters {
            let id = adapter.id().to_string();
            if providers.insert(id.clone(), adapter).is_some() {
                return Err(OtpError::configuration(format!("duplicate provider id '{}'", id)));
            }
        }

        for candidate in table.candidates() {
            let adapter = providers.get(&candidate.provider).ok_or_else(|| {
                OtpError::configuration(format!(
                    "routing references unknown provider '{}'",
                    candidate.provider
                ))
            })?;
            if !adapter.supports(candidate.channel) {
                return Err(OtpError::configuration(format!(
                    "provider '{}' cannot send over {}",
                    candidate.provider, candidate.channel
                )));
            }
        }

        Ok(Self {
            table,
            providers,
            timeout,
        })
    }

    /// Try candidates in order until one is accepted.
    ///
    /// Every attempt is recorded. Acceptance means the upstream queued the
    /// message, not that it reached the handset.
    ///
    /// # Returns
    /// * `Ok(DeliveryResult)` - Accepting candidate and all attempts so far
    /// * `Err(OtpError::AllChannelsFailed)` - Every candidate failed
    pub async fn deliver(&self, phone: &CanonicalPhone, code: &str) -> OtpResult<DeliveryResult> {
        let masked = mask_phone_number(phone.as_str());
        let candidates = self.table.candidates_for(phone);
        let mut attempts = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let attempt = self.attempt(phone, code, candidate).await;

            if attempt.is_accepted() {
                info!(
                    phone = %masked,
                    provider = %attempt.provider,
                    channel = %attempt.channel,
                    elapsed_ms = attempt.elapsed_ms,
                    attempt = attempts.len() + 1,
                    event = "otp_delivery_accepted",
                    "Verification code accepted by provider"
                );
                let provider_ref = attempt.provider_ref.clone().unwrap_or_default();
                let (provider, channel) = (attempt.provider.clone(), attempt.channel);
                attempts.push(attempt);
                return Ok(DeliveryResult {
                    provider,
                    channel,
                    provider_ref,
                    attempts,
                });
            }

            warn!(
                phone = %masked,
                provider = %attempt.provider,
                channel = %attempt.channel,
                sender = attempt.sender.as_deref().unwrap_or("default"),
                classification = ?attempt.classification,
                detail = attempt.detail.as_deref().unwrap_or(""),
                elapsed_ms = attempt.elapsed_ms,
                event = "otp_delivery_attempt_failed",
                "Delivery attempt failed, trying next candidate"
            );
            attempts.push(attempt);
        }

        let err = OtpError::AllChannelsFailed { attempts };
        warn!(
            phone = %masked,
            diagnosis = %err.diagnosis().unwrap_or_default(),
            event = "otp_delivery_exhausted",
            "{}",
            err
        );
        Err(err)
    }

    /// Delivery status of a previously accepted message
    pub async fn fetch_status(&self, provider: &str, provider_ref: &str) -> OtpResult<DeliveryStatus> {
        let adapter = self
            .providers
            .get(provider)
            .ok_or_else(|| OtpError::UnknownProvider {
                provider: provider.to_string(),
            })?;

        match tokio::time::timeout(self.timeout, adapter.fetch_status(provider_ref)).await {
            Ok(result) => result.map_err(OtpError::Provider),
            Err(_) => Err(OtpError::Provider(ProviderError::timeout(self.timeout))),
        }
    }

    async fn attempt(&self, phone: &CanonicalPhone, code: &str, candidate: &RouteCandidate) -> DeliveryAttempt {
        let sender = candidate.sender.clone();
        let started = Instant::now();

        let result = match self.providers.get(&candidate.provider) {
            Some(adapter) => {
                let call = adapter.send(phone, code, candidate.channel, candidate.sender.as_deref());
                match tokio::time::timeout(self.timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::timeout(self.timeout)),
                }
            }
            None => Err(ProviderError::unknown(
                "unregistered_provider",
                format!("provider '{}' is not registered", candidate.provider),
            )),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(provider_ref) => DeliveryAttempt::accepted(
                phone.clone(),
                candidate.channel,
                candidate.provider.as_str(),
                sender,
                provider_ref,
                elapsed_ms,
            ),
            Err(error) => DeliveryAttempt::failed(
                phone.clone(),
                candidate.channel,
                candidate.provider.as_str(),
                sender,
                error,
                elapsed_ms,
            ),
        }
    }
}
