//! API response types and wrappers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,

    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,

    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}

/// Machine-readable error payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code (e.g. `invalid_phone`)
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Additional structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            }),
            timestamp: Utc::now(),
        }
    }

    /// Attach structured details to an error response
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.details = Some(details);
        }
        self
    }

    /// Check if the response is successful
    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let response: ApiResponse<()> = ApiResponse::error("invalid_phone", "bad number")
            .with_details(serde_json::json!({"field": "phone"}));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "invalid_phone");
        assert_eq!(json["error"]["details"]["field"], "phone");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_success_response_omits_error() {
        let response = ApiResponse::success(42u32);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], 42);
        assert!(json.get("error").is_none());
        assert!(response.is_success());
    }
}
