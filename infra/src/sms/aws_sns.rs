//! AWS SNS Provider Implementation
//!
//! Publishes the templated code directly to the phone number as a
//! transactional SMS. SNS exposes no per-message status lookup, so accepted
//! messages report [`DeliveryStatus::Sent`].

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::{
    config::Region,
    error::ProvideErrorMetadata,
    types::MessageAttributeValue,
    Client as SnsClient,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use mazad_core::{CanonicalPhone, DeliveryStatus, FailureClass, ProviderAdapter, ProviderError};
use mazad_shared::utils::mask_phone_number;
use mazad_shared::Channel;

use super::render_template;
use crate::InfrastructureError;

/// AWS SNS provider configuration
#[derive(Debug, Clone)]
pub struct AwsSnsConfig {
    pub id: String,
    /// AWS Region (e.g., "eu-central-1"); the default chain applies when unset
    pub region: Option<String>,
    /// Static credentials; the default chain applies when unset
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Alphanumeric sender ID (not supported in every country)
    pub sender_id: Option<String>,
    pub template: String,
    pub code_ttl_minutes: i64,
}

/// Raw SMS provider on AWS SNS
pub struct AwsSnsAdapter {
    id: String,
    client: SnsClient,
    sender_id: Option<String>,
    template: String,
    code_ttl_minutes: i64,
}

impl AwsSnsAdapter {
    /// Create a new AWS SNS adapter
    pub async fn new(config: AwsSnsConfig) -> Result<Self, InfrastructureError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        match (&config.access_key_id, &config.secret_access_key) {
            (Some(key), Some(secret)) => {
                let credentials_provider = aws_credential_types::Credentials::new(
                    key,
                    secret,
                    None,
                    None,
                    "mazad_sns_provider",
                );
                loader = loader.credentials_provider(credentials_provider);
            }
            (None, None) => {}
            _ => {
                return Err(InfrastructureError::Config(format!(
                    "provider '{}': access_key_id and secret_access_key must be set together",
                    config.id
                )))
            }
        }

        let client = SnsClient::new(&loader.load().await);
        info!(provider = %config.id, region = ?config.region, "AWS SNS adapter initialized");

        Ok(Self {
            id: config.id,
            client,
            sender_id: config.sender_id,
            template: config.template,
            code_ttl_minutes: config.code_ttl_minutes,
        })
    }

    fn string_attribute(value: &str) -> Result<MessageAttributeValue, ProviderError> {
        MessageAttributeValue::builder()
            .data_type("String")
            .string_value(value)
            .build()
            .map_err(|e| ProviderError::unknown("invalid_request", e.to_string()))
    }

    fn message_attributes(
        &self,
        sender: Option<&str>,
    ) -> Result<HashMap<String, MessageAttributeValue>, ProviderError> {
        let mut attributes = HashMap::new();
        attributes.insert(
            "AWS.SNS.SMS.SMSType".to_string(),
            Self::string_attribute("Transactional")?,
        );

        if let Some(sender_id) = sender.or(self.sender_id.as_deref()) {
            attributes.insert(
                "AWS.SNS.SMS.SenderID".to_string(),
                Self::string_attribute(sender_id)?,
            );
        }

        Ok(attributes)
    }
}

/// Map an SNS error code to a failure class
fn classify_sns_error(code: Option<&str>) -> FailureClass {
    match code {
        Some("Throttled") | Some("ThrottledException") | Some("Throttling")
        | Some("KMSThrottling") => FailureClass::RateLimited,
        Some("OptedOut") | Some("EndpointDisabled") => FailureClass::CarrierRejected,
        Some(other) => FailureClass::Unknown(other.to_string()),
        None => FailureClass::Unknown("transport".to_string()),
    }
}

#[async_trait]
impl ProviderAdapter for AwsSnsAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, channel: Channel) -> bool {
        channel == Channel::Sms
    }

    async fn send(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        channel: Channel,
        sender: Option<&str>,
    ) -> Result<String, ProviderError> {
        if channel != Channel::Sms {
            return Err(ProviderError::unknown(
                "unsupported_channel",
                format!("AWS SNS cannot deliver over {}", channel),
            ));
        }

        let attributes = self.message_attributes(sender)?;
        let result = self
            .client
            .publish()
            .phone_number(phone.as_str())
            .message(render_template(&self.template, code, self.code_ttl_minutes))
            .set_message_attributes(Some(attributes))
            .send()
            .await;

        match result {
            Ok(response) => {
                let message_id = response.message_id().unwrap_or_default().to_string();
                debug!(
                    provider = %self.id,
                    phone = %mask_phone_number(phone.as_str()),
                    message_id = %message_id,
                    "SMS published via AWS SNS"
                );
                Ok(message_id)
            }
            Err(e) => {
                let class = classify_sns_error(e.code());
                let message = e.message().map(str::to_string).unwrap_or_else(|| e.to_string());
                warn!(
                    provider = %self.id,
                    phone = %mask_phone_number(phone.as_str()),
                    class = %class,
                    "AWS SNS publish failed: {}",
                    message
                );
                Err(ProviderError::new(class, message))
            }
        }
    }

    async fn fetch_status(&self, _provider_ref: &str) -> Result<DeliveryStatus, ProviderError> {
        Ok(DeliveryStatus::Sent)
    }
}
