//! Upstream provider failure classification

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why an upstream provider refused or failed to queue a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "class", content = "code", rename_all = "snake_case")]
pub enum FailureClass {
    /// Destination country not enabled for the sender or account
    GeoPermissionDenied,
    /// Upstream content or spam filter blocked the message
    ContentBlocked,
    /// Carrier refused or the handset is unreachable
    CarrierRejected,
    /// Sender identity is not valid or not permitted
    InvalidSender,
    RateLimited,
    /// Unclassified upstream code, transport failure or timeout
    Unknown(String),
}

impl FailureClass {
    /// Parse a snake_case class name; anything unrecognized becomes `Unknown`
    pub fn from_name(name: &str) -> Self {
        match name {
            "geo_permission_denied" => FailureClass::GeoPermissionDenied,
            "content_blocked" => FailureClass::ContentBlocked,
            "carrier_rejected" => FailureClass::CarrierRejected,
            "invalid_sender" => FailureClass::InvalidSender,
            "rate_limited" => FailureClass::RateLimited,
            other => FailureClass::Unknown(other.to_string()),
        }
    }

    /// Known rejections are attributed to the destination or sender, not to the provider
    pub fn is_known_rejection(&self) -> bool {
        !matches!(self, FailureClass::Unknown(_))
    }

    /// Failures that point at the destination rather than at our setup
    pub fn is_destination_block(&self) -> bool {
        matches!(
            self,
            FailureClass::GeoPermissionDenied | FailureClass::CarrierRejected
        )
    }

    pub fn name(&self) -> &str {
        match self {
            FailureClass::GeoPermissionDenied => "geo_permission_denied",
            FailureClass::ContentBlocked => "content_blocked",
            FailureClass::CarrierRejected => "carrier_rejected",
            FailureClass::InvalidSender => "invalid_sender",
            FailureClass::RateLimited => "rate_limited",
            FailureClass::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureClass::Unknown(code) => write!(f, "unknown({})", code),
            other => f.write_str(other.name()),
        }
    }
}

/// A single failed provider call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{class}: {message}")]
pub struct ProviderError {
    pub class: FailureClass,
    pub message: String,
}

impl ProviderError {
    pub fn new(class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn unknown(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FailureClass::Unknown(code.into()), message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::unknown(
            "timeout",
            format!("provider did not respond within {}s", after.as_secs_f64()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(
            FailureClass::from_name("geo_permission_denied"),
            FailureClass::GeoPermissionDenied
        );
        assert_eq!(
            FailureClass::from_name("30008"),
            FailureClass::Unknown(String::from("30008"))
        );
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(FailureClass::CarrierRejected).unwrap();
        assert_eq!(json, serde_json::json!({ "class": "carrier_rejected" }));

        let json = serde_json::to_value(FailureClass::Unknown(String::from("timeout"))).unwrap();
        assert_eq!(json, serde_json::json!({ "class": "unknown", "code": "timeout" }));
    }

    #[test]
    fn test_timeout_is_unknown() {
        let err = ProviderError::timeout(Duration::from_secs(10));
        assert_eq!(err.class, FailureClass::Unknown(String::from("timeout")));
        assert!(!err.class.is_known_rejection());
        assert_eq!(err.to_string(), "unknown(timeout): provider did not respond within 10s");
    }
}
