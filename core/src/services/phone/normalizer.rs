//! Phone number normalizer
//!
//! Turns the many ways users type a number into one canonical international
//! form for the configured country. Accepted prefix forms, first match wins:
//!
//! | Input                 | Example (`cc = 964`)     |
//! |-----------------------|--------------------------|
//! | doubled `+<cc><cc>`   | `+9649647701234567`      |
//! | `00<cc>`              | `009647701234567`        |
//! | trunk `0`             | `07701234567`            |
//! | bare `<cc>`           | `9647701234567`          |
//! | `+<cc>`               | `+9647701234567`         |
//!
//! Anything else, including numbers for other countries, is rejected.

use mazad_shared::OtpConfig;
use regex::Regex;

use crate::domain::CanonicalPhone;
use crate::errors::{OtpError, OtpResult};

/// Characters users put between digits; they carry no meaning
fn is_formatting(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '.' | '(' | ')' | '/')
}

/// Canonicalizes and validates phone numbers for one country
#[derive(Debug, Clone)]
pub struct PhoneNormalizer {
    country_code: String,
    min_digits: usize,
    max_digits: usize,
    canonical: Regex,
}

impl PhoneNormalizer {
    /// Create a normalizer for `country_code` (digits, no `+`) whose national
    /// numbers have between `min_digits` and `max_digits` digits
    pub fn new(country_code: &str, min_digits: usize, max_digits: usize) -> OtpResult<Self> {
        if country_code.is_empty() || !country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpError::configuration(format!(
                "country code must be digits, got '{}'",
                country_code
            )));
        }
        if min_digits == 0 || min_digits > max_digits {
            return Err(OtpError::configuration(format!(
                "invalid national number range {}..={}",
                min_digits, max_digits
            )));
        }

        let pattern = format!(r"^\+{}\d{{{},{}}}$", country_code, min_digits, max_digits);
        let canonical = Regex::new(&pattern)
            .map_err(|e| OtpError::configuration(format!("numbering plan pattern: {}", e)))?;

        Ok(Self {
            country_code: country_code.to_string(),
            min_digits,
            max_digits,
            canonical,
        })
    }

    pub fn from_config(config: &OtpConfig) -> OtpResult<Self> {
        Self::new(
            &config.country_code,
            config.national_number_min_digits,
            config.national_number_max_digits,
        )
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Canonicalize `raw`, or `None` when it is not a valid number for this plan
    pub fn normalize(&self, raw: &str) -> Option<CanonicalPhone> {
        let stripped: String = raw.chars().filter(|c| !is_formatting(*c)).collect();

        let (has_plus, digits) = match stripped.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, stripped.as_str()),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let national = self.national_part(has_plus, digits)?;
        if !self.valid_national_length(national) {
            return None;
        }

        let phone = CanonicalPhone::new(&self.country_code, national);
        self.is_valid(&phone).then_some(phone)
    }

    /// Whether `phone` matches `+<cc>` followed by an in-range national number
    pub fn is_valid(&self, phone: &CanonicalPhone) -> bool {
        self.canonical.is_match(phone.as_str())
    }

    /// Resolve the prefix form and return the national number
    fn national_part<'a>(&self, has_plus: bool, digits: &'a str) -> Option<&'a str> {
        let cc = self.country_code.as_str();

        if has_plus {
            let after_cc = digits.strip_prefix(cc)?;
            // Doubled country code, collapsed only when the literal reading is not
            // itself a valid number. Canonical values therefore normalize to themselves.
            if let Some(collapsed) = after_cc.strip_prefix(cc) {
                if !self.valid_national_length(after_cc) {
                    return Some(collapsed);
                }
            }
            return Some(after_cc);
        }

        if let Some(international) = digits.strip_prefix("00") {
            return international.strip_prefix(cc);
        }
        if let Some(trunk) = digits.strip_prefix('0') {
            return Some(trunk);
        }
        digits.strip_prefix(cc)
    }

    fn valid_national_length(&self, national: &str) -> bool {
        (self.min_digits..=self.max_digits).contains(&national.len())
    }
}
