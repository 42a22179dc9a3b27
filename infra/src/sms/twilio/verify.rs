//! Twilio Verify adapter
//!
//! Starts a Verify verification with the application's own code passed as
//! `CustomCode`; the application keeps ownership of the verification record
//! and never calls Verify's check endpoint. The provider reference is
//! `<service_sid>/<verification_sid>`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use mazad_core::{CanonicalPhone, DeliveryStatus, ProviderAdapter, ProviderError};
use mazad_shared::utils::mask_phone_number;
use mazad_shared::Channel;

use super::client::{invalid_reference, is_sid, TwilioCredentials, TwilioHttp, VERIFY_BASE_URL};
use crate::InfrastructureError;

/// Settings for one Twilio Verify provider instance
#[derive(Debug, Clone)]
pub struct TwilioVerifyConfig {
    /// Identifier referenced by routing rules
    pub id: String,
    pub credentials: TwilioCredentials,
    /// Default Verify service SID (`VA...`)
    pub service_sid: String,
    /// API host, overridable for tests
    pub base_url: String,
    pub timeout: Duration,
}

impl TwilioVerifyConfig {
    pub fn new(
        id: impl Into<String>,
        credentials: TwilioCredentials,
        service_sid: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            credentials,
            service_sid: service_sid.into(),
            base_url: VERIFY_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Verification resource as returned by the Verify API
#[derive(Debug, Deserialize)]
struct VerificationResource {
    sid: String,
    service_sid: String,
    status: String,
}

/// Hosted verification provider
pub struct TwilioVerifyAdapter {
    id: String,
    service_sid: String,
    http: TwilioHttp,
}

impl TwilioVerifyAdapter {
    pub fn new(config: TwilioVerifyConfig) -> Result<Self, InfrastructureError> {
        if config.service_sid.is_empty() {
            return Err(InfrastructureError::Config(format!(
                "provider '{}': service_sid must not be empty",
                config.id
            )));
        }

        let http = TwilioHttp::new(config.credentials, &config.base_url, config.timeout)?;
        info!(provider = %config.id, "Twilio Verify adapter initialized");

        Ok(Self {
            id: config.id,
            service_sid: config.service_sid,
            http,
        })
    }

    fn channel_name(channel: Channel) -> &'static str {
        match channel {
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
        }
    }

    fn split_reference(provider_ref: &str) -> Result<(&str, &str), ProviderError> {
        match provider_ref.split_once('/') {
            Some((service, verification))
                if is_sid(service, &["VA"]) && is_sid(verification, &["VE"]) =>
            {
                Ok((service, verification))
            }
            _ => Err(invalid_reference(provider_ref)),
        }
    }

    fn map_status(status: &str) -> DeliveryStatus {
        match status {
            "pending" => DeliveryStatus::Sent,
            "approved" => DeliveryStatus::Delivered,
            other => DeliveryStatus::Failed(other.to_string()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for TwilioVerifyAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, _channel: Channel) -> bool {
        true
    }

    async fn send(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        channel: Channel,
        sender: Option<&str>,
    ) -> Result<String, ProviderError> {
        let service_sid = sender.unwrap_or(&self.service_sid);
        let path = format!("/v2/Services/{}/Verifications", service_sid);
        let form = [
            ("To", phone.as_str().to_string()),
            ("Channel", Self::channel_name(channel).to_string()),
            ("CustomCode", code.to_string()),
        ];

        let resource: VerificationResource = self.http.post_form(&path, &form).await.map_err(|e| {
            warn!(
                provider = %self.id,
                phone = %mask_phone_number(phone.as_str()),
                class = %e.class,
                "Twilio Verify rejected verification: {}",
                e.message
            );
            e
        })?;

        debug!(
            provider = %self.id,
            phone = %mask_phone_number(phone.as_str()),
            status = %resource.status,
            "Twilio Verify verification started"
        );

        Ok(format!("{}/{}", resource.service_sid, resource.sid))
    }

    async fn fetch_status(&self, provider_ref: &str) -> Result<DeliveryStatus, ProviderError> {
        let (service_sid, verification_sid) = Self::split_reference(provider_ref)?;
        let path = format!("/v2/Services/{}/Verifications/{}", service_sid, verification_sid);

        let resource: VerificationResource = self.http.get_json(&path).await?;
        Ok(Self::map_status(&resource.status))
    }
}
