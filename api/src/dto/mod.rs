//! Request and response bodies

pub mod otp;

pub use otp::{SendOtpRequest, SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
