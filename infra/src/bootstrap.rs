//! Startup wiring
//!
//! Turns an [`AppConfig`] into a ready [`OtpService`]: provider adapters are
//! constructed from `providers`, the routing table is compiled and checked
//! against them, and the configured store backend is connected. Every error
//! here is a configuration or connectivity problem and is fatal at startup.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use mazad_core::{
    DeliveryRouter, ExpirySweeper, InMemoryVerificationStore, OtpService, OtpServiceConfig,
    PhoneNormalizer, ProviderAdapter, RoutingTable, VerificationStore,
};
use mazad_shared::{AppConfig, ProviderConfig, ProviderKind, StoreBackend};

use crate::sms::{
    MockProvider, TwilioCredentials, TwilioMessagingAdapter, TwilioMessagingConfig,
    TwilioVerifyAdapter, TwilioVerifyConfig,
};
use crate::InfrastructureError;

/// Everything the binary needs to serve OTP requests
pub struct OtpRuntime {
    pub service: Arc<OtpService>,
    pub store: Arc<dyn VerificationStore>,
    pub sweeper: Arc<ExpirySweeper>,
}

/// Assemble the OTP service and its sweeper
pub async fn build_otp_runtime(config: &AppConfig) -> Result<OtpRuntime, InfrastructureError> {
    let normalizer = PhoneNormalizer::from_config(&config.otp)?;
    let store = build_store(config).await?;
    let adapters = build_adapters(config).await?;

    let table = RoutingTable::from_config(&config.routing);
    let router = DeliveryRouter::new(
        table,
        adapters,
        Duration::from_secs(config.otp.provider_timeout_secs),
    )?;

    let service = OtpService::new(
        normalizer,
        store.clone(),
        Arc::new(router),
        OtpServiceConfig::from(&config.otp),
    );
    let sweeper = ExpirySweeper::new(
        store.clone(),
        Duration::from_secs(config.otp.sweep_interval_secs),
        config.store.expired_retention(),
        config.otp.sweep_enabled,
    );

    info!(
        country_code = %config.otp.country_code,
        providers = config.providers.len(),
        "OTP service assembled"
    );

    Ok(OtpRuntime {
        service: Arc::new(service),
        store,
        sweeper: Arc::new(sweeper),
    })
}

/// Connect the configured verification store backend
pub async fn build_store(
    config: &AppConfig,
) -> Result<Arc<dyn VerificationStore>, InfrastructureError> {
    let max_attempts = config.otp.max_attempts;

    match &config.store.backend {
        StoreBackend::Memory => {
            info!(backend = "memory", "Using in-memory verification store");
            Ok(Arc::new(InMemoryVerificationStore::new(max_attempts)))
        }

        #[cfg(feature = "redis-cache")]
        StoreBackend::Redis => {
            use crate::cache::{RedisClient, RedisVerificationStore};

            let client = RedisClient::connect(config.store.redis.clone()).await?;
            info!(backend = "redis", "Using Redis verification store");
            Ok(Arc::new(RedisVerificationStore::new(
                client,
                max_attempts,
                config.store.expired_retention(),
            )))
        }

        #[cfg(feature = "mysql")]
        StoreBackend::Mysql => {
            use crate::database::{DatabasePool, MySqlVerificationStore};

            let pool = DatabasePool::new(&config.store.database).await?;
            pool.migrate().await?;
            info!(backend = "mysql", "Using MySQL verification store");
            Ok(Arc::new(MySqlVerificationStore::new(
                pool.get_pool().clone(),
                max_attempts,
            )))
        }

        #[allow(unreachable_patterns)]
        other => Err(InfrastructureError::Config(format!(
            "store backend {:?} is not compiled into this build",
            other
        ))),
    }
}

/// Construct one adapter per configured provider
pub async fn build_adapters(
    config: &AppConfig,
) -> Result<Vec<Arc<dyn ProviderAdapter>>, InfrastructureError> {
    let mut adapters = Vec::with_capacity(config.providers.len());
    for provider in &config.providers {
        adapters.push(build_adapter(provider, config).await?);
        info!(provider = %provider.id, kind = provider.kind.name(), "Provider registered");
    }
    Ok(adapters)
}

async fn build_adapter(
    provider: &ProviderConfig,
    config: &AppConfig,
) -> Result<Arc<dyn ProviderAdapter>, InfrastructureError> {
    let timeout = Duration::from_secs(config.otp.provider_timeout_secs);
    let minutes = config.otp.code_ttl_minutes;

    let adapter: Arc<dyn ProviderAdapter> = match &provider.kind {
        ProviderKind::TwilioVerify {
            account_sid,
            auth_token,
            service_sid,
            base_url,
        } => {
            let credentials =
                TwilioCredentials::resolve(account_sid.as_deref(), auth_token.as_deref())?;
            let mut verify = TwilioVerifyConfig::new(&provider.id, credentials, service_sid);
            verify.timeout = timeout;
            if let Some(url) = base_url {
                verify.base_url = url.clone();
            }
            Arc::new(TwilioVerifyAdapter::new(verify)?)
        }

        ProviderKind::TwilioMessaging {
            account_sid,
            auth_token,
            from,
            messaging_service_sid,
            whatsapp_from,
            whatsapp_content_sid,
            template,
            base_url,
        } => {
            let credentials =
                TwilioCredentials::resolve(account_sid.as_deref(), auth_token.as_deref())?;
            let mut messaging = TwilioMessagingConfig::new(&provider.id, credentials);
            messaging.from = from.clone();
            messaging.messaging_service_sid = messaging_service_sid.clone();
            messaging.whatsapp_from = whatsapp_from.clone();
            messaging.whatsapp_content_sid = whatsapp_content_sid.clone();
            messaging.template = template.clone();
            messaging.code_ttl_minutes = minutes;
            messaging.timeout = timeout;
            if let Some(url) = base_url {
                messaging.base_url = url.clone();
            }
            Arc::new(TwilioMessagingAdapter::new(messaging)?)
        }

        #[cfg(feature = "aws-sns")]
        ProviderKind::AwsSns {
            region,
            access_key_id,
            secret_access_key,
            sender_id,
            template,
        } => {
            use crate::sms::{AwsSnsAdapter, AwsSnsConfig};

            let sns = AwsSnsConfig {
                id: provider.id.clone(),
                region: region.clone(),
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                sender_id: sender_id.clone(),
                template: template.clone(),
                code_ttl_minutes: minutes,
            };
            Arc::new(AwsSnsAdapter::new(sns).await?)
        }

        #[cfg(not(feature = "aws-sns"))]
        ProviderKind::AwsSns { .. } => {
            return Err(InfrastructureError::Config(format!(
                "provider '{}': built without the aws-sns feature",
                provider.id
            )))
        }

        ProviderKind::Mock { fail_with } => {
            Arc::new(MockProvider::from_config(&provider.id, fail_with.as_deref()))
        }
    };

    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazad_core::{FailureClass, OtpError};
    use mazad_shared::Channel;

    const CONFIG: &str = r#"
[otp]
sweep_enabled = false

[[providers]]
id = "blocked"
kind = "mock"
fail_with = "geo_permission_denied"

[[providers]]
id = "primary"
kind = "mock"

[[routing.default]]
provider = "blocked"
channel = "sms"

[[routing.default]]
provider = "primary"
channel = "whatsapp"
"#;

    #[tokio::test]
    async fn test_runtime_from_config_falls_back() {
        let config = AppConfig::from_toml_str(CONFIG).unwrap();
        let runtime = build_otp_runtime(&config).await.unwrap();

        let receipt = runtime.service.send("0770 123 4567").await.unwrap();
        assert_eq!(receipt.phone.as_str(), "+9647701234567");
        assert_eq!(receipt.delivery.succeeded_via(), ("primary", Channel::Whatsapp));
        assert_eq!(receipt.delivery.attempts.len(), 2);
        assert_eq!(
            receipt.delivery.attempts[0].classification,
            Some(FailureClass::GeoPermissionDenied)
        );

        assert!(runtime.sweeper.clone().start_background_task().is_none());
    }

    #[tokio::test]
    async fn test_routing_to_unsupported_channel_is_rejected() {
        let toml = r#"
[[providers]]
id = "twilio"
kind = "twilio_messaging"
account_sid = "ACtest"
auth_token = "secret"
from = "+15550001111"

[[routing.default]]
provider = "twilio"
channel = "whatsapp"
"#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        let result = build_otp_runtime(&config).await;

        assert!(matches!(
            result,
            Err(InfrastructureError::Otp(OtpError::Configuration { .. }))
        ));
    }

    #[tokio::test]
    async fn test_twilio_adapters_from_config() {
        let toml = r#"
[[providers]]
id = "verify"
kind = "twilio_verify"
account_sid = "ACtest"
auth_token = "secret"
service_sid = "VAdefault"

[[providers]]
id = "messaging"
kind = "twilio_messaging"
account_sid = "ACtest"
auth_token = "secret"
whatsapp_from = "+15550002222"

[[routing.default]]
provider = "verify"
channel = "sms"

[[routing.default]]
provider = "messaging"
channel = "whatsapp"
"#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        let adapters = build_adapters(&config).await.unwrap();

        let ids: Vec<&str> = adapters.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["verify", "messaging"]);
        assert!(adapters[1].supports(Channel::Whatsapp));
        assert!(!adapters[1].supports(Channel::Sms));
    }
}
