//! Application state and factory

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use mazad_core::OtpService;
use mazad_shared::ApiResponse;

use crate::handlers::error::json_error_handler;
use crate::routes;

/// Shared services available to every handler
pub struct AppState {
    pub otp_service: Arc<OtpService>,
}

impl AppState {
    pub fn new(otp_service: Arc<OtpService>) -> Self {
        Self { otp_service }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(routes::health::health_check))
        .service(web::scope("/api/v1").configure(routes::otp::configure))
        .default_service(web::route().to(|| async {
            HttpResponse::NotFound().json(ApiResponse::<()>::error(
                "NOT_FOUND",
                "The requested resource was not found",
            ))
        }))
}
