//! Routing table: which providers to try, in which order, for a destination

use mazad_shared::{Channel, RouteEntry, RoutingConfig};
use std::collections::HashSet;

use crate::domain::CanonicalPhone;

/// One (provider, channel, sender) candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCandidate {
    pub provider: String,
    pub channel: Channel,
    pub sender: Option<String>,
    allow_list: HashSet<String>,
}

impl RouteCandidate {
    pub fn new(provider: impl Into<String>, channel: Channel) -> Self {
        Self {
            provider: provider.into(),
            channel,
            sender: None,
            allow_list: HashSet::new(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Restrict the candidate to the given canonical numbers
    pub fn with_allow_list<I, S>(mut self, numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_list = numbers.into_iter().map(Into::into).collect();
        self
    }

    /// An empty allow-list admits every destination
    pub fn applies_to(&self, phone: &CanonicalPhone) -> bool {
        self.allow_list.is_empty() || self.allow_list.contains(phone.as_str())
    }
}

impl From<&RouteEntry> for RouteCandidate {
    fn from(entry: &RouteEntry) -> Self {
        Self {
            provider: entry.provider.clone(),
            channel: entry.channel,
            sender: entry.sender.clone(),
            allow_list: entry.allow_list.iter().cloned().collect(),
        }
    }
}

/// Static routing rules, immutable after load
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    default: Vec<RouteCandidate>,
    /// Sorted longest prefix first
    prefixes: Vec<(String, Vec<RouteCandidate>)>,
}

impl RoutingTable {
    pub fn new(default: Vec<RouteCandidate>) -> Self {
        Self {
            default,
            prefixes: Vec::new(),
        }
    }

    /// Add candidates for a dialing prefix (digits, no `+`)
    pub fn with_prefix(mut self, prefix: impl Into<String>, candidates: Vec<RouteCandidate>) -> Self {
        self.prefixes.push((prefix.into(), candidates));
        self.prefixes
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        let default = config.default.iter().map(RouteCandidate::from).collect();
        config
            .countries
            .iter()
            .fold(Self::new(default), |table, (prefix, entries)| {
                table.with_prefix(prefix.clone(), entries.iter().map(RouteCandidate::from).collect())
            })
    }

    /// Ordered candidates for `phone`.
    ///
    /// The longest matching prefix wins; allow-lists are applied afterwards. When
    /// nothing remains the default list is used, filtered the same way.
    pub fn candidates_for(&self, phone: &CanonicalPhone) -> Vec<&RouteCandidate> {
        let digits = phone.digits();
        let matched = self
            .prefixes
            .iter()
            .find(|(prefix, _)| digits.starts_with(prefix.as_str()))
            .map(|(_, candidates)| Self::admitted(candidates, phone))
            .unwrap_or_default();

        if matched.is_empty() {
            Self::admitted(&self.default, phone)
        } else {
            matched
        }
    }

    /// Every candidate in the table
    pub fn candidates(&self) -> impl Iterator<Item = &RouteCandidate> {
        self.default
            .iter()
            .chain(self.prefixes.iter().flat_map(|(_, list)| list.iter()))
    }

    fn admitted<'a>(candidates: &'a [RouteCandidate], phone: &CanonicalPhone) -> Vec<&'a RouteCandidate> {
        candidates.iter().filter(|c| c.applies_to(phone)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(national: &str) -> CanonicalPhone {
        CanonicalPhone::new("964", national)
    }

    fn providers(list: &[&RouteCandidate]) -> Vec<String> {
        list.iter().map(|c| c.provider.clone()).collect()
    }

    #[test]
    fn test_default_when_no_prefix_matches() {
        let table = RoutingTable::new(vec![RouteCandidate::new("global", Channel::Sms)])
            .with_prefix("971", vec![RouteCandidate::new("uae", Channel::Sms)]);

        assert_eq!(providers(&table.candidates_for(&phone("7701234567"))), vec!["global"]);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = RoutingTable::new(vec![RouteCandidate::new("global", Channel::Sms)])
            .with_prefix("964", vec![RouteCandidate::new("iraq", Channel::Sms)])
            .with_prefix("96475", vec![RouteCandidate::new("korek", Channel::Whatsapp)]);

        assert_eq!(providers(&table.candidates_for(&phone("7501234567"))), vec!["korek"]);
        assert_eq!(providers(&table.candidates_for(&phone("7701234567"))), vec!["iraq"]);
    }

    #[test]
    fn test_allow_list_filters_candidates() {
        let table = RoutingTable::new(vec![RouteCandidate::new("global", Channel::Sms)]).with_prefix(
            "964",
            vec![
                RouteCandidate::new("trial", Channel::Sms).with_allow_list(["+9647701234567"]),
                RouteCandidate::new("whatsapp", Channel::Whatsapp),
            ],
        );

        assert_eq!(
            providers(&table.candidates_for(&phone("7701234567"))),
            vec!["trial", "whatsapp"]
        );
        assert_eq!(
            providers(&table.candidates_for(&phone("7709999999"))),
            vec!["whatsapp"]
        );
    }

    #[test]
    fn test_fully_filtered_prefix_falls_back_to_default() {
        let table = RoutingTable::new(vec![RouteCandidate::new("global", Channel::Sms)]).with_prefix(
            "964",
            vec![RouteCandidate::new("trial", Channel::Sms).with_allow_list(["+9647701234567"])],
        );

        assert_eq!(providers(&table.candidates_for(&phone("7709999999"))), vec!["global"]);
    }

    #[test]
    fn test_from_config() {
        let mut config = RoutingConfig::default();
        config.default.push(RouteEntry::new("verify", Channel::Sms));
        config.countries.insert(
            String::from("964"),
            vec![
                RouteEntry::new("verify", Channel::Sms).with_sender("VA_LOCAL"),
                RouteEntry::new("messaging", Channel::Whatsapp),
            ],
        );

        let table = RoutingTable::from_config(&config);
        let candidates = table.candidates_for(&phone("7701234567"));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].sender.as_deref(), Some("VA_LOCAL"));
        assert_eq!(candidates[1].channel, Channel::Whatsapp);
        assert_eq!(table.candidates().count(), 3);
    }
}
