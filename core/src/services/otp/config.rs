//! Configuration for the OTP service

use chrono::Duration;
use mazad_shared::config::otp::MAX_CODE_TTL_MINUTES;
use mazad_shared::OtpConfig;

/// Runtime settings for code issuance
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Digits per generated code
    pub code_length: usize,
    /// How long a code stays valid
    pub code_ttl: Duration,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            code_ttl: Duration::minutes(5),
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_length: config.code_length,
            code_ttl: Duration::minutes(config.code_ttl_minutes.clamp(1, MAX_CODE_TTL_MINUTES)),
        }
    }
}
