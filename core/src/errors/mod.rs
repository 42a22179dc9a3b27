//! Error taxonomy for OTP issuance, verification and delivery.

mod provider;

pub use provider::{FailureClass, ProviderError};

use thiserror::Error;

use crate::domain::delivery::{diagnose, DeliveryAttempt};

/// Errors surfaced by `OtpService` and its collaborators
#[derive(Error, Debug)]
pub enum OtpError {
    #[error("Invalid phone number: {input}")]
    InvalidPhone { input: String },

    #[error("Verification store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("All delivery channels failed after {} attempts", attempts.len())]
    AllChannelsFailed { attempts: Vec<DeliveryAttempt> },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Unknown provider: {provider}")]
    UnknownProvider { provider: String },

    #[error("Provider error: {0}")]
    Provider(ProviderError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl OtpError {
    pub fn configuration(message: impl Into<String>) -> Self {
        OtpError::Configuration {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            OtpError::InvalidPhone { .. } => "INVALID_PHONE",
            OtpError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            OtpError::AllChannelsFailed { .. } => "ALL_CHANNELS_FAILED",
            OtpError::Configuration { .. } => "CONFIGURATION_ERROR",
            OtpError::UnknownProvider { .. } => "UNKNOWN_PROVIDER",
            OtpError::Provider(_) => "PROVIDER_ERROR",
            OtpError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Actionable explanation for an exhausted routing list
    pub fn diagnosis(&self) -> Option<String> {
        match self {
            OtpError::AllChannelsFailed { attempts } => Some(diagnose(attempts)),
            _ => None,
        }
    }
}

/// Verification store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend unreachable, timed out or dropped the connection
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("store error: {message}")]
    Internal { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        StoreError::Internal {
            message: message.into(),
        }
    }
}

impl From<StoreError> for OtpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { message } => OtpError::StoreUnavailable { message },
            StoreError::Internal { message } => OtpError::Internal { message },
        }
    }
}

pub type OtpResult<T> = Result<T, OtpError>;
