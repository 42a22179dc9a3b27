//! SMS Provider Module
//!
//! [`ProviderAdapter`](mazad_core::ProviderAdapter) implementations for the
//! upstreams a routing rule can name:
//!
//! - **Twilio Verify**: hosted verification with the application's own code
//! - **Twilio Messaging**: templated SMS and WhatsApp messages
//! - **AWS SNS**: direct SMS publish (feature `aws-sns`)
//! - **Mock**: logs codes instead of sending them, for development
//!
//! Adapters never retry; fallback across providers is the router's job.

pub mod mock_sms;
pub mod twilio;

// AWS SNS provider (feature-gated)
#[cfg(feature = "aws-sns")]
pub mod aws_sns;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use mock_sms::MockProvider;
pub use twilio::{
    TwilioCredentials, TwilioMessagingAdapter, TwilioMessagingConfig, TwilioVerifyAdapter,
    TwilioVerifyConfig,
};

#[cfg(feature = "aws-sns")]
pub use aws_sns::{AwsSnsAdapter, AwsSnsConfig};

/// Fill the `{code}` and `{minutes}` placeholders of a message template
pub fn render_template(template: &str, code: &str, minutes: i64) -> String {
    template
        .replace("{code}", code)
        .replace("{minutes}", &minutes.to_string())
}
