//! HTTP boundary for the OTP service
//!
//! Exposes `POST /api/v1/otp/send`, `POST /api/v1/otp/verify` and
//! `GET /health`. Handlers only translate between JSON and
//! [`OtpService`](mazad_core::OtpService) calls.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
