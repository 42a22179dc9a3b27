//! OTP issuance and verification configuration

use serde::{Deserialize, Serialize};

/// Longest accepted code lifetime (one day)
pub const MAX_CODE_TTL_MINUTES: i64 = 24 * 60;

/// Settings for phone normalization, code generation and verification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Country calling code of the numbering plan, without `+`
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// Minimum national number length after the country code
    #[serde(default = "default_min_digits")]
    pub national_number_min_digits: usize,

    /// Maximum national number length after the country code
    #[serde(default = "default_max_digits")]
    pub national_number_max_digits: usize,

    /// Number of digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Code lifetime in minutes
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: i64,

    /// Mismatched attempts before a code is discarded (0 = unlimited)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Timeout for a single provider call, in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Run the background expiry sweep
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,

    /// Interval between expiry sweeps, in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            country_code: default_country_code(),
            national_number_min_digits: default_min_digits(),
            national_number_max_digits: default_max_digits(),
            code_length: default_code_length(),
            code_ttl_minutes: default_code_ttl_minutes(),
            max_attempts: default_max_attempts(),
            provider_timeout_secs: default_provider_timeout_secs(),
            sweep_enabled: default_sweep_enabled(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl OtpConfig {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.country_code.is_empty() || !self.country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("otp.country_code must be digits, got '{}'", self.country_code));
        }
        if self.national_number_min_digits == 0
            || self.national_number_min_digits > self.national_number_max_digits
        {
            return Err(String::from(
                "otp.national_number_min_digits must be between 1 and national_number_max_digits",
            ));
        }
        if !(4..=10).contains(&self.code_length) {
            return Err(format!("otp.code_length must be 4..=10, got {}", self.code_length));
        }
        if !(1..=MAX_CODE_TTL_MINUTES).contains(&self.code_ttl_minutes) {
            return Err(format!(
                "otp.code_ttl_minutes must be 1..={}, got {}",
                MAX_CODE_TTL_MINUTES, self.code_ttl_minutes
            ));
        }
        if self.provider_timeout_secs == 0 {
            return Err(String::from("otp.provider_timeout_secs must be positive"));
        }
        if self.sweep_enabled && self.sweep_interval_secs == 0 {
            return Err(String::from("otp.sweep_interval_secs must be positive"));
        }
        Ok(())
    }
}

fn default_country_code() -> String {
    String::from("964")
}

fn default_min_digits() -> usize {
    9
}

fn default_max_digits() -> usize {
    10
}

fn default_code_length() -> usize {
    6
}

fn default_code_ttl_minutes() -> i64 {
    5
}

fn default_max_attempts() -> u32 {
    5
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_sweep_enabled() -> bool {
    true
}

fn default_sweep_interval_secs() -> u64 {
    300
}
