//! Upstream delivery provider configuration

use serde::{Deserialize, Serialize};

/// A configured provider instance, referenced from routing by `id`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub id: String,

    #[serde(flatten)]
    pub kind: ProviderKind,
}

/// Provider-specific settings, tagged by `kind`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderKind {
    /// Twilio Verify hosted verification service
    TwilioVerify {
        /// Falls back to `TWILIO_ACCOUNT_SID`
        #[serde(default)]
        account_sid: Option<String>,
        /// Falls back to `TWILIO_AUTH_TOKEN`
        #[serde(default)]
        auth_token: Option<String>,
        /// Default Verify service SID (`VA...`)
        service_sid: String,
        #[serde(default)]
        base_url: Option<String>,
    },

    /// Twilio Programmable Messaging (SMS and WhatsApp)
    TwilioMessaging {
        #[serde(default)]
        account_sid: Option<String>,
        #[serde(default)]
        auth_token: Option<String>,
        /// Default SMS from-number
        #[serde(default)]
        from: Option<String>,
        /// Messaging service SID (`MG...`), used when no from-number applies
        #[serde(default)]
        messaging_service_sid: Option<String>,
        /// WhatsApp-enabled sender number
        #[serde(default)]
        whatsapp_from: Option<String>,
        /// Approved WhatsApp content template (`HX...`)
        #[serde(default)]
        whatsapp_content_sid: Option<String>,
        /// Message body with `{code}` and `{minutes}` placeholders
        #[serde(default = "default_template")]
        template: String,
        #[serde(default)]
        base_url: Option<String>,
    },

    /// AWS SNS direct SMS publish
    AwsSns {
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        access_key_id: Option<String>,
        #[serde(default)]
        secret_access_key: Option<String>,
        /// Alphanumeric sender ID
        #[serde(default)]
        sender_id: Option<String>,
        /// Message body with `{code}` and `{minutes}` placeholders
        #[serde(default = "default_template")]
        template: String,
    },

    /// Logs codes instead of sending them
    Mock {
        /// Failure class to report on every send (e.g. `carrier_rejected`)
        #[serde(default)]
        fail_with: Option<String>,
    },
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::TwilioVerify { .. } => "twilio_verify",
            ProviderKind::TwilioMessaging { .. } => "twilio_messaging",
            ProviderKind::AwsSns { .. } => "aws_sns",
            ProviderKind::Mock { .. } => "mock",
        }
    }
}

/// Body used by raw messaging providers when none is configured
pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "Your Mazad verification code is {code}. It expires in {minutes} minutes.";

pub(crate) fn default_template() -> String {
    String::from(DEFAULT_MESSAGE_TEMPLATE)
}
