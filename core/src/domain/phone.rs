//! Canonical phone number value type.

use serde::{Serialize, Serializer};
use std::fmt;

/// A phone number in international format: `+`, country code, national number.
///
/// Values are only produced by [`PhoneNormalizer`](crate::services::PhoneNormalizer),
/// so holding one means the number passed the configured numbering plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPhone {
    value: String,
    country_code_len: usize,
}

impl CanonicalPhone {
    pub(crate) fn new(country_code: &str, national_number: &str) -> Self {
        Self {
            value: format!("+{}{}", country_code, national_number),
            country_code_len: country_code.len(),
        }
    }

    /// Full international form, e.g. `+9647701234567`
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Digits without the leading `+`
    pub fn digits(&self) -> &str {
        &self.value[1..]
    }

    pub fn country_code(&self) -> &str {
        &self.value[1..=self.country_code_len]
    }

    pub fn national_number(&self) -> &str {
        &self.value[1 + self.country_code_len..]
    }
}

impl fmt::Display for CanonicalPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for CanonicalPhone {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl Serialize for CanonicalPhone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}
