use actix_web::{web, HttpResponse};
use validator::Validate;

use mazad_shared::utils::mask_phone_number;
use mazad_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::{SendOtpRequest, SendOtpResponse};
use crate::handlers::{validation_error, ApiError};

/// Handler for POST /api/v1/otp/send
///
/// # Request Body
///
/// ```json
/// { "phone": "0770 123 4567" }
/// ```
///
/// # Responses
///
/// * `200` - Code stored and accepted by a provider
/// * `400` - `INVALID_PHONE` or `VALIDATION_ERROR`
/// * `502` - `ALL_CHANNELS_FAILED`, with every attempt and a diagnosis
/// * `503` - `STORE_UNAVAILABLE`
pub async fn send_otp(
    state: web::Data<AppState>,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = request.validate() {
        return Ok(validation_error(&errors));
    }

    tracing::info!(
        phone = %mask_phone_number(&request.phone),
        "Processing send OTP request"
    );

    let receipt = state.otp_service.send(&request.phone).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SendOtpResponse::from(receipt))))
}
