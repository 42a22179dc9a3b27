//! Twilio error-code classification
//!
//! Twilio reports failures as a numeric `code` in the JSON error body (REST
//! API) or as `error_code` on a message resource. The table below maps the
//! codes seen on OTP traffic to a [`FailureClass`].

use serde::Deserialize;

use mazad_core::FailureClass;

/// Error body returned by the Twilio REST API
#[derive(Debug, Deserialize)]
pub(crate) struct TwilioErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Map a Twilio error code to a known failure class
pub fn classify_code(code: i64) -> Option<FailureClass> {
    let class = match code {
        // Permission to send to this region is not enabled
        21408 | 60605 => FailureClass::GeoPermissionDenied,
        // Message filtered, or WhatsApp template/content rejected
        30007 | 63016 => FailureClass::ContentBlocked,
        // Queue overflow, unreachable handset, unknown destination, landline,
        // unsubscribed recipient, carrier-level block on Verify
        30003..=30006 | 21610 | 60410 => FailureClass::CarrierRejected,
        // Sender not a valid Twilio number / not SMS or WhatsApp capable
        21606 | 21608 | 21612 | 21659 | 63007 => FailureClass::InvalidSender,
        20429 | 60203 => FailureClass::RateLimited,
        _ => return None,
    };
    Some(class)
}

/// Classify a failed API call from its HTTP status and Twilio error code
pub fn classify_error(http_status: u16, code: Option<i64>) -> FailureClass {
    if let Some(class) = code.and_then(classify_code) {
        return class;
    }
    if http_status == 429 {
        return FailureClass::RateLimited;
    }

    match code {
        Some(code) => FailureClass::Unknown(code.to_string()),
        None => FailureClass::Unknown(format!("http_{}", http_status)),
    }
}

/// Human-readable reason for an error code on a message resource
pub(crate) fn describe_code(code: i64, message: Option<&str>) -> String {
    let class = classify_code(code).unwrap_or_else(|| FailureClass::Unknown(code.to_string()));
    match message {
        Some(message) => format!("{} ({}): {}", code, class, message),
        None => format!("{} ({})", code, class),
    }
}
