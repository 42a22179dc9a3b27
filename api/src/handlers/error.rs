//! Mapping of service errors to HTTP responses

use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse, ResponseError,
};
use serde_json::json;
use validator::ValidationErrors;

use mazad_core::OtpError;
use mazad_shared::ApiResponse;

/// An [`OtpError`] rendered as a JSON error response
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub OtpError);

impl ApiError {
    /// Message safe to show to clients
    fn public_message(&self) -> String {
        match &self.0 {
            OtpError::InvalidPhone { .. }
            | OtpError::AllChannelsFailed { .. }
            | OtpError::UnknownProvider { .. } => self.0.to_string(),
            OtpError::StoreUnavailable { .. } => {
                "Verification storage is temporarily unavailable".to_string()
            }
            OtpError::Provider(_) => "Upstream provider request failed".to_string(),
            OtpError::Configuration { .. } | OtpError::Internal { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            OtpError::InvalidPhone { .. } => StatusCode::BAD_REQUEST,
            OtpError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            OtpError::AllChannelsFailed { .. } | OtpError::Provider(_) => StatusCode::BAD_GATEWAY,
            OtpError::UnknownProvider { .. } => StatusCode::NOT_FOUND,
            OtpError::Configuration { .. } | OtpError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = ApiResponse::<()>::error(self.0.error_code(), self.public_message());

        if let OtpError::AllChannelsFailed { attempts } = &self.0 {
            body = body.with_details(json!({
                "diagnosis": self.0.diagnosis(),
                "attempts": attempts,
            }));
        }

        if self.status_code().is_server_error() {
            tracing::error!(code = self.0.error_code(), "Request failed: {}", self.0);
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// 400 response listing the fields that failed validation
pub fn validation_error(errors: &ValidationErrors) -> HttpResponse {
    let fields: serde_json::Map<String, serde_json::Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), json!(messages))
        })
        .collect();

    HttpResponse::BadRequest().json(
        ApiResponse::<()>::error("VALIDATION_ERROR", "Invalid request data")
            .with_details(json!({ "fields": fields })),
    )
}

/// Malformed or missing JSON bodies
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ApiResponse::<()>::error(
        "INVALID_REQUEST",
        format!("Invalid JSON body: {}", err),
    ));
    InternalError::from_response(err, response).into()
}
