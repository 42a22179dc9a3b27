//! End-to-end OTP flow through the public API of `mazad_core`

use async_trait::async_trait;
use mazad_core::{
    CanonicalPhone, DeliveryRouter, DeliveryStatus, FailureClass, InMemoryVerificationStore,
    OtpError, OtpService, OtpServiceConfig, PhoneNormalizer, ProviderAdapter, ProviderError,
    RoutingTable, VerifyOutcome,
};
use mazad_shared::{AppConfig, Channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records what it was asked to send; optionally refuses with a fixed class
struct RecordingProvider {
    id: &'static str,
    refuse_with: Option<FailureClass>,
    outbox: Mutex<Vec<(String, String, Channel)>>,
}

impl RecordingProvider {
    fn new(id: &'static str, refuse_with: Option<FailureClass>) -> Self {
        Self {
            id,
            refuse_with,
            outbox: Mutex::new(Vec::new()),
        }
    }

    fn last_code(&self) -> Option<String> {
        self.outbox.lock().unwrap().last().map(|(_, code, _)| code.clone())
    }
}

#[async_trait]
impl ProviderAdapter for RecordingProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn supports(&self, _channel: Channel) -> bool {
        true
    }

    async fn send(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        channel: Channel,
        _sender: Option<&str>,
    ) -> Result<String, ProviderError> {
        self.outbox
            .lock()
            .unwrap()
            .push((phone.to_string(), code.to_string(), channel));
        match &self.refuse_with {
            Some(class) => Err(ProviderError::new(class.clone(), "refused")),
            None => Ok(format!("{}-1", self.id)),
        }
    }

    async fn fetch_status(&self, _provider_ref: &str) -> Result<DeliveryStatus, ProviderError> {
        Ok(DeliveryStatus::Sent)
    }
}

const CONFIG: &str = r#"
[otp]
code_length = 6
code_ttl_minutes = 5
max_attempts = 3

[[providers]]
id = "sms-primary"
kind = "mock"

[[providers]]
id = "whatsapp"
kind = "mock"

[[routing.default]]
provider = "sms-primary"
channel = "sms"

[[routing.countries.964]]
provider = "sms-primary"
channel = "sms"

[[routing.countries.964]]
provider = "whatsapp"
channel = "whatsapp"
"#;

fn build(sms: Arc<RecordingProvider>, whatsapp: Arc<RecordingProvider>) -> OtpService {
    let config = AppConfig::from_toml_str(CONFIG).unwrap();
    let router = DeliveryRouter::new(
        RoutingTable::from_config(&config.routing),
        vec![sms as Arc<dyn ProviderAdapter>, whatsapp as Arc<dyn ProviderAdapter>],
        Duration::from_secs(config.otp.provider_timeout_secs),
    )
    .unwrap();

    OtpService::new(
        PhoneNormalizer::from_config(&config.otp).unwrap(),
        Arc::new(InMemoryVerificationStore::new(config.otp.max_attempts)),
        Arc::new(router),
        OtpServiceConfig::from(&config.otp),
    )
}

#[tokio::test]
async fn test_whatsapp_fallback_after_carrier_block() {
    let sms = Arc::new(RecordingProvider::new(
        "sms-primary",
        Some(FailureClass::CarrierRejected),
    ));
    let whatsapp = Arc::new(RecordingProvider::new("whatsapp", None));
    let service = build(sms.clone(), whatsapp.clone());

    let receipt = service.send("0770 123 4567").await.unwrap();

    assert_eq!(receipt.phone.as_str(), "+9647701234567");
    assert_eq!(receipt.delivery.succeeded_via(), ("whatsapp", Channel::Whatsapp));
    assert_eq!(receipt.delivery.attempts.len(), 2);

    // Both candidates carried the same code
    let code = whatsapp.last_code().unwrap();
    assert_eq!(sms.last_code().as_deref(), Some(code.as_str()));

    assert_eq!(
        service.verify("9647701234567", &code).await.unwrap(),
        VerifyOutcome::Valid
    );
}

#[tokio::test]
async fn test_all_channels_failed_is_actionable() {
    let sms = Arc::new(RecordingProvider::new(
        "sms-primary",
        Some(FailureClass::GeoPermissionDenied),
    ));
    let whatsapp = Arc::new(RecordingProvider::new(
        "whatsapp",
        Some(FailureClass::CarrierRejected),
    ));
    let service = build(sms, whatsapp);

    let err = service.send("+9647701234567").await.unwrap_err();

    assert_eq!(err.error_code(), "ALL_CHANNELS_FAILED");
    assert_eq!(
        err.diagnosis().as_deref(),
        Some("destination likely blocked by carrier or geo-restricted")
    );
    assert!(matches!(err, OtpError::AllChannelsFailed { attempts } if attempts.len() == 2));
}
