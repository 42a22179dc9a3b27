//! OTP route handlers
//!
//! - `POST /otp/send`: issue and deliver a fresh code
//! - `POST /otp/verify`: check a submitted code

pub mod send;
pub mod verify;

use actix_web::web;

/// Register the OTP routes under the caller's scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/otp")
            .route("/send", web::post().to(send::send_otp))
            .route("/verify", web::post().to(verify::verify_otp)),
    );
}
