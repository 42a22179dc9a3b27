use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::json;
use validator::Validate;

use mazad_core::VerifyOutcome;
use mazad_shared::utils::mask_phone_number;
use mazad_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::{VerifyOtpRequest, VerifyOtpResponse};
use crate::handlers::{validation_error, ApiError};

/// Handler for POST /api/v1/otp/verify
///
/// # Request Body
///
/// ```json
/// { "phone": "+9647701234567", "code": "482913" }
/// ```
///
/// # Responses
///
/// * `200` - `valid`
/// * `400` - `invalid_code`, `INVALID_PHONE` or `VALIDATION_ERROR`
/// * `404` - `not_found`
/// * `410` - `expired`
/// * `429` - `attempts_exceeded`
/// * `503` - `STORE_UNAVAILABLE`
pub async fn verify_otp(
    state: web::Data<AppState>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = request.validate() {
        return Ok(validation_error(&errors));
    }

    let outcome = state
        .otp_service
        .verify(&request.phone, &request.code)
        .await?;

    tracing::info!(
        phone = %mask_phone_number(&request.phone),
        outcome = outcome.as_str(),
        "Processed verify OTP request"
    );

    if outcome.is_valid() {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(VerifyOtpResponse {
            verified: true,
            outcome,
        })));
    }

    let body = ApiResponse::<()>::error(outcome.as_str().to_uppercase(), outcome_message(outcome))
        .with_details(json!({ "outcome": outcome }));
    Ok(HttpResponse::build(outcome_status(outcome)).json(body))
}

fn outcome_status(outcome: VerifyOutcome) -> StatusCode {
    match outcome {
        VerifyOutcome::Valid => StatusCode::OK,
        VerifyOutcome::InvalidCode => StatusCode::BAD_REQUEST,
        VerifyOutcome::NotFound => StatusCode::NOT_FOUND,
        VerifyOutcome::Expired => StatusCode::GONE,
        VerifyOutcome::AttemptsExceeded => StatusCode::TOO_MANY_REQUESTS,
    }
}

fn outcome_message(outcome: VerifyOutcome) -> &'static str {
    match outcome {
        VerifyOutcome::Valid => "Code verified",
        VerifyOutcome::InvalidCode => "The code does not match",
        VerifyOutcome::NotFound => "No outstanding code for this phone number",
        VerifyOutcome::Expired => "The code has expired; request a new one",
        VerifyOutcome::AttemptsExceeded => "Too many incorrect attempts; request a new code",
    }
}
