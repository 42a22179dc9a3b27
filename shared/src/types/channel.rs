//! Delivery channel type

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transport used to deliver a verification code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Plain text message
    #[default]
    Sms,
    /// WhatsApp message (template or session)
    Whatsapp,
}

impl Channel {
    /// Wire name used in configuration and by upstream providers
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sms" => Ok(Channel::Sms),
            "whatsapp" | "wa" => Ok(Channel::Whatsapp),
            _ => Err(format!("Invalid channel: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!("sms".parse::<Channel>(), Ok(Channel::Sms));
        assert_eq!("WhatsApp".parse::<Channel>(), Ok(Channel::Whatsapp));
        assert!("voice".parse::<Channel>().is_err());
    }

    #[test]
    fn test_channel_serde_names() {
        let json = serde_json::to_string(&Channel::Whatsapp).unwrap();
        assert_eq!(json, "\"whatsapp\"");
        let parsed: Channel = serde_json::from_str("\"sms\"").unwrap();
        assert_eq!(parsed, Channel::Sms);
    }
}
