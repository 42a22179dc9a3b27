//! Unit tests for the mock provider

use mazad_core::{DeliveryStatus, FailureClass, ProviderAdapter};
use mazad_shared::Channel;

use super::test_phone;
use crate::sms::MockProvider;

#[tokio::test]
async fn test_mock_accepts_and_counts() {
    let provider = MockProvider::new("mock");
    let phone = test_phone();

    let reference = provider.send(&phone, "123456", Channel::Sms, None).await.unwrap();
    assert!(reference.starts_with("mock-"));
    provider
        .send(&phone, "654321", Channel::Whatsapp, Some("+15550001111"))
        .await
        .unwrap();

    assert_eq!(provider.get_message_count(), 2);
    assert_eq!(
        provider.fetch_status(&reference).await.unwrap(),
        DeliveryStatus::Delivered
    );
}

#[tokio::test]
async fn test_mock_scripted_failure() {
    let provider = MockProvider::from_config("flaky", Some("geo_permission_denied"));

    let err = provider
        .send(&test_phone(), "123456", Channel::Sms, None)
        .await
        .unwrap_err();

    assert_eq!(err.class, FailureClass::GeoPermissionDenied);
    assert_eq!(provider.get_message_count(), 0);
}

#[tokio::test]
async fn test_mock_unknown_reference() {
    let provider = MockProvider::new("mock");
    assert!(provider.fetch_status("SM123").await.is_err());
    assert!(provider.supports(Channel::Sms));
    assert!(provider.supports(Channel::Whatsapp));
}
