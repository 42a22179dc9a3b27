//! Twilio Programmable Messaging adapter
//!
//! Sends the code inside a templated body over SMS, or over WhatsApp using
//! `whatsapp:` addressing. When an approved WhatsApp content template is
//! configured the code travels as template variable `1` instead of a body.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use mazad_core::{CanonicalPhone, DeliveryStatus, FailureClass, ProviderAdapter, ProviderError};
use mazad_shared::utils::mask_phone_number;
use mazad_shared::Channel;

use super::client::{invalid_reference, is_sid, TwilioCredentials, TwilioHttp, API_BASE_URL};
use super::errors::describe_code;
use crate::sms::render_template;
use crate::InfrastructureError;

/// Settings for one Twilio Messaging provider instance
#[derive(Debug, Clone)]
pub struct TwilioMessagingConfig {
    /// Identifier referenced by routing rules
    pub id: String,
    pub credentials: TwilioCredentials,
    /// Default SMS from-number
    pub from: Option<String>,
    /// Messaging service SID (`MG...`)
    pub messaging_service_sid: Option<String>,
    /// WhatsApp-enabled sender number
    pub whatsapp_from: Option<String>,
    /// Approved WhatsApp content template (`HX...`)
    pub whatsapp_content_sid: Option<String>,
    /// Body with `{code}` and `{minutes}` placeholders
    pub template: String,
    /// Substituted for `{minutes}`
    pub code_ttl_minutes: i64,
    /// API host, overridable for tests
    pub base_url: String,
    pub timeout: Duration,
}

impl TwilioMessagingConfig {
    pub fn new(id: impl Into<String>, credentials: TwilioCredentials) -> Self {
        Self {
            id: id.into(),
            credentials,
            from: None,
            messaging_service_sid: None,
            whatsapp_from: None,
            whatsapp_content_sid: None,
            template: mazad_shared::config::providers::DEFAULT_MESSAGE_TEMPLATE.to_string(),
            code_ttl_minutes: 5,
            base_url: API_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Message resource as returned by the Messaging API
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    status: String,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Raw messaging provider for SMS and WhatsApp
pub struct TwilioMessagingAdapter {
    id: String,
    from: Option<String>,
    messaging_service_sid: Option<String>,
    whatsapp_from: Option<String>,
    whatsapp_content_sid: Option<String>,
    template: String,
    code_ttl_minutes: i64,
    http: TwilioHttp,
}

impl TwilioMessagingAdapter {
    pub fn new(config: TwilioMessagingConfig) -> Result<Self, InfrastructureError> {
        if config.from.is_none()
            && config.messaging_service_sid.is_none()
            && config.whatsapp_from.is_none()
        {
            return Err(InfrastructureError::Config(format!(
                "provider '{}': one of from, messaging_service_sid or whatsapp_from is required",
                config.id
            )));
        }

        let http = TwilioHttp::new(config.credentials, &config.base_url, config.timeout)?;
        info!(provider = %config.id, "Twilio Messaging adapter initialized");

        Ok(Self {
            id: config.id,
            from: config.from,
            messaging_service_sid: config.messaging_service_sid,
            whatsapp_from: config.whatsapp_from,
            whatsapp_content_sid: config.whatsapp_content_sid,
            template: config.template,
            code_ttl_minutes: config.code_ttl_minutes,
            http,
        })
    }

    /// Pick the sender field: a hint wins, then the channel's from-number,
    /// then the messaging service
    fn sender_field(
        &self,
        channel: Channel,
        hint: Option<&str>,
    ) -> Result<(&'static str, String), ProviderError> {
        let default_from = match channel {
            Channel::Sms => self.from.as_deref(),
            Channel::Whatsapp => self.whatsapp_from.as_deref(),
        };

        match (hint, default_from, self.messaging_service_sid.as_deref()) {
            (Some(hint), _, _) if hint.starts_with("MG") => {
                Ok(("MessagingServiceSid", hint.to_string()))
            }
            (Some(from), _, _) | (None, Some(from), _) => {
                Ok(("From", address(channel, from)))
            }
            (None, None, Some(service)) => Ok(("MessagingServiceSid", service.to_string())),
            (None, None, None) => Err(ProviderError::new(
                FailureClass::InvalidSender,
                format!("no {} sender configured", channel),
            )),
        }
    }

    fn map_status(message: &MessageResource) -> DeliveryStatus {
        let reason = || match message.error_code {
            Some(code) => describe_code(code, message.error_message.as_deref()),
            None => message.status.clone(),
        };

        match message.status.as_str() {
            "accepted" | "scheduled" | "queued" | "sending" => DeliveryStatus::Pending,
            "sent" => DeliveryStatus::Sent,
            "delivered" | "read" => DeliveryStatus::Delivered,
            "undelivered" => DeliveryStatus::Undelivered(reason()),
            _ => DeliveryStatus::Failed(reason()),
        }
    }
}

/// Prefix `whatsapp:` for WhatsApp addressing
fn address(channel: Channel, number: &str) -> String {
    match channel {
        Channel::Whatsapp if !number.starts_with("whatsapp:") => format!("whatsapp:{}", number),
        _ => number.to_string(),
    }
}

#[async_trait]
impl ProviderAdapter for TwilioMessagingAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, channel: Channel) -> bool {
        match channel {
            Channel::Sms => self.from.is_some() || self.messaging_service_sid.is_some(),
            Channel::Whatsapp => {
                self.whatsapp_from.is_some() || self.messaging_service_sid.is_some()
            }
        }
    }

    async fn send(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        channel: Channel,
        sender: Option<&str>,
    ) -> Result<String, ProviderError> {
        let mut form = vec![("To", address(channel, phone.as_str()))];
        form.push(self.sender_field(channel, sender)?);

        match (channel, self.whatsapp_content_sid.as_deref()) {
            (Channel::Whatsapp, Some(content_sid)) => {
                form.push(("ContentSid", content_sid.to_string()));
                form.push((
                    "ContentVariables",
                    serde_json::json!({ "1": code }).to_string(),
                ));
            }
            _ => form.push((
                "Body",
                render_template(&self.template, code, self.code_ttl_minutes),
            )),
        }

        let path = format!("/2010-04-01/Accounts/{}/Messages.json", self.http.account_sid());
        let message: MessageResource = self.http.post_form(&path, &form).await.map_err(|e| {
            warn!(
                provider = %self.id,
                channel = %channel,
                phone = %mask_phone_number(phone.as_str()),
                class = %e.class,
                "Twilio Messaging rejected message: {}",
                e.message
            );
            e
        })?;

        debug!(
            provider = %self.id,
            channel = %channel,
            phone = %mask_phone_number(phone.as_str()),
            status = %message.status,
            "Twilio message queued"
        );

        Ok(message.sid)
    }

    async fn fetch_status(&self, provider_ref: &str) -> Result<DeliveryStatus, ProviderError> {
        if !is_sid(provider_ref, &["SM", "MM"]) {
            return Err(invalid_reference(provider_ref));
        }

        let path = format!(
            "/2010-04-01/Accounts/{}/Messages/{}.json",
            self.http.account_sid(),
            provider_ref
        );

        let message: MessageResource = self.http.get_json(&path).await?;
        Ok(Self::map_status(&message))
    }
}
