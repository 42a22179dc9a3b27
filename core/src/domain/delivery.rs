//! Delivery attempts, results and upstream delivery status.

use mazad_shared::Channel;
use serde::Serialize;
use std::collections::BTreeSet;

use super::phone::CanonicalPhone;
use crate::errors::{FailureClass, ProviderError};

/// How a single provider call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Upstream queued the message
    Accepted,
    /// Upstream refused for a known reason
    Rejected,
    /// Unclassified upstream failure, transport error or timeout
    ProviderError,
}

/// One provider call made while delivering a code. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryAttempt {
    pub destination: CanonicalPhone,
    pub channel: Channel,
    pub provider: String,
    pub sender: Option<String>,
    pub outcome: AttemptOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<FailureClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub elapsed_ms: u64,
}

impl DeliveryAttempt {
    pub fn accepted(
        destination: CanonicalPhone,
        channel: Channel,
        provider: impl Into<String>,
        sender: Option<String>,
        provider_ref: String,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            destination,
            channel,
            provider: provider.into(),
            sender,
            outcome: AttemptOutcome::Accepted,
            classification: None,
            provider_ref: Some(provider_ref),
            detail: None,
            elapsed_ms,
        }
    }

    pub fn failed(
        destination: CanonicalPhone,
        channel: Channel,
        provider: impl Into<String>,
        sender: Option<String>,
        error: ProviderError,
        elapsed_ms: u64,
    ) -> Self {
        let outcome = if error.class.is_known_rejection() {
            AttemptOutcome::Rejected
        } else {
            AttemptOutcome::ProviderError
        };
        Self {
            destination,
            channel,
            provider: provider.into(),
            sender,
            outcome,
            classification: Some(error.class),
            provider_ref: None,
            detail: Some(error.message),
            elapsed_ms,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome == AttemptOutcome::Accepted
    }
}

/// Successful delivery: the accepting candidate plus every attempt in order
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryResult {
    pub provider: String,
    pub channel: Channel,
    pub provider_ref: String,
    pub attempts: Vec<DeliveryAttempt>,
}

impl DeliveryResult {
    pub fn succeeded_via(&self) -> (&str, Channel) {
        (&self.provider, self.channel)
    }
}

/// Upstream delivery state of a previously accepted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Delivered,
    Failed(String),
    Undelivered(String),
}

impl DeliveryStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, DeliveryStatus::Pending | DeliveryStatus::Sent)
    }
}

/// Summarize why every candidate failed
pub fn diagnose(attempts: &[DeliveryAttempt]) -> String {
    let classes: Vec<&FailureClass> = attempts
        .iter()
        .filter_map(|a| a.classification.as_ref())
        .collect();

    if classes.is_empty() {
        return String::from("no delivery candidates are configured for this destination");
    }

    let all = |pred: fn(&FailureClass) -> bool| classes.iter().all(|c| pred(c));

    if all(FailureClass::is_destination_block) {
        String::from("destination likely blocked by carrier or geo-restricted")
    } else if all(|c| matches!(c, FailureClass::RateLimited)) {
        String::from("upstream providers are rate limiting requests; retry later")
    } else if all(|c| matches!(c, FailureClass::InvalidSender)) {
        String::from("sender identities are misconfigured or not permitted for this destination")
    } else if all(|c| matches!(c, FailureClass::ContentBlocked)) {
        String::from("message content was blocked by upstream filters")
    } else if all(|c| matches!(c, FailureClass::Unknown(code) if code == "timeout")) {
        String::from("providers did not respond in time")
    } else {
        let distinct: BTreeSet<String> = classes.iter().map(|c| c.to_string()).collect();
        format!(
            "delivery failed on every candidate ({})",
            distinct.into_iter().collect::<Vec<_>>().join(", ")
        )
    }
}
