//! Delivery routing configuration

use crate::types::Channel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered delivery candidates per destination prefix
///
/// ```toml
/// [[routing.default]]
/// provider = "twilio-verify"
/// channel = "sms"
///
/// [[routing.countries.964]]
/// provider = "twilio-sms"
/// channel = "sms"
/// sender = "MAZAD"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RoutingConfig {
    /// Candidates used when no prefix matches
    #[serde(default)]
    pub default: Vec<RouteEntry>,

    /// Candidates keyed by dialing prefix (digits, no `+`)
    #[serde(default)]
    pub countries: HashMap<String, Vec<RouteEntry>>,
}

/// One (provider, channel, sender) candidate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteEntry {
    /// Identifier of a configured provider
    pub provider: String,

    #[serde(default)]
    pub channel: Channel,

    /// Sender identity override for this candidate
    #[serde(default)]
    pub sender: Option<String>,

    /// When non-empty, the candidate only applies to these canonical numbers
    #[serde(default)]
    pub allow_list: Vec<String>,
}

impl RouteEntry {
    pub fn new(provider: impl Into<String>, channel: Channel) -> Self {
        Self {
            provider: provider.into(),
            channel,
            sender: None,
            allow_list: Vec::new(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_allow_list<I, S>(mut self, numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_list = numbers.into_iter().map(Into::into).collect();
        self
    }
}

impl RoutingConfig {
    /// All entries, default list first
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.default
            .iter()
            .chain(self.countries.values().flat_map(|list| list.iter()))
    }

    /// Check prefixes and non-empty lists
    pub fn validate(&self) -> Result<(), String> {
        if self.default.is_empty() {
            return Err(String::from("routing.default must list at least one candidate"));
        }
        for (prefix, entries) in &self.countries {
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!("routing prefix '{}' must be digits", prefix));
            }
            if entries.is_empty() {
                return Err(format!("routing.countries.{} has no candidates", prefix));
            }
        }
        Ok(())
    }
}
