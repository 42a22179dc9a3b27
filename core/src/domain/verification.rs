//! Verification record entity and verification outcomes.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::Serialize;
use std::fmt;

use super::phone::CanonicalPhone;

/// The single outstanding code for a phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationRecord {
    /// Primary key
    pub phone: CanonicalPhone,

    #[serde(skip_serializing)]
    pub code: String,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Mismatched verification attempts so far
    pub attempts: u32,
}

impl VerificationRecord {
    pub fn new(phone: CanonicalPhone, code: impl Into<String>, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            phone,
            code: code.into(),
            created_at: now,
            expires_at: now + ttl,
            attempts: 0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Constant-time comparison against a submitted code
    pub fn matches(&self, submitted: &str) -> bool {
        self.code.len() == submitted.len() && constant_time_eq(self.code.as_bytes(), submitted.as_bytes())
    }

    /// Evaluate a submitted code, bumping the attempt counter on mismatch.
    ///
    /// The caller deletes the record when the outcome
    /// [`removes_record`](VerifyOutcome::removes_record), otherwise it persists
    /// the updated `attempts`. `max_attempts == 0` disables the lockout.
    pub fn check(&mut self, submitted: &str, now: DateTime<Utc>, max_attempts: u32) -> VerifyOutcome {
        if self.is_expired(now) {
            return VerifyOutcome::Expired;
        }
        if self.matches(submitted) {
            return VerifyOutcome::Valid;
        }

        self.attempts += 1;
        if max_attempts > 0 && self.attempts >= max_attempts {
            VerifyOutcome::AttemptsExceeded
        } else {
            VerifyOutcome::InvalidCode
        }
    }
}

/// Result of verifying a submitted code. These are outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    Valid,
    InvalidCode,
    /// A code was sent but its TTL elapsed
    Expired,
    /// No code outstanding for this phone
    NotFound,
    /// Too many mismatches; the code was discarded
    AttemptsExceeded,
}

impl VerifyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyOutcome::Valid => "valid",
            VerifyOutcome::InvalidCode => "invalid_code",
            VerifyOutcome::Expired => "expired",
            VerifyOutcome::NotFound => "not_found",
            VerifyOutcome::AttemptsExceeded => "attempts_exceeded",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyOutcome::Valid)
    }

    /// Whether the store must delete the record after this outcome
    pub fn removes_record(&self) -> bool {
        matches!(
            self,
            VerifyOutcome::Valid | VerifyOutcome::Expired | VerifyOutcome::AttemptsExceeded
        )
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
