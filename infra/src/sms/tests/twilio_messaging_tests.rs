//! Twilio Messaging adapter against a mock HTTP server

use httpmock::prelude::*;
use serde_json::json;

use mazad_core::{DeliveryStatus, FailureClass, ProviderAdapter};
use mazad_shared::Channel;

use super::test_phone;
use crate::sms::{TwilioCredentials, TwilioMessagingAdapter, TwilioMessagingConfig};

const MESSAGES_PATH: &str = "/2010-04-01/Accounts/ACtest/Messages.json";

fn config(server: &MockServer) -> TwilioMessagingConfig {
    let mut config =
        TwilioMessagingConfig::new("twilio-sms", TwilioCredentials::new("ACtest", "secret"));
    config.base_url = server.base_url();
    config.from = Some("+15550001111".to_string());
    config.template = "Code {code}, valid {minutes} min".to_string();
    config
}

fn queued(sid: &str) -> serde_json::Value {
    json!({ "sid": sid, "status": "queued", "error_code": null, "error_message": null })
}

#[tokio::test]
async fn test_sms_renders_template() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(MESSAGES_PATH)
                .x_www_form_urlencoded_tuple("To", "+9647701234567")
                .x_www_form_urlencoded_tuple("From", "+15550001111")
                .x_www_form_urlencoded_tuple("Body", "Code 482913, valid 5 min");
            then.status(201).json_body(queued("SM0001"));
        })
        .await;

    let adapter = TwilioMessagingAdapter::new(config(&server)).unwrap();
    let reference = adapter
        .send(&test_phone(), "482913", Channel::Sms, None)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(reference, "SM0001");
}

#[tokio::test]
async fn test_whatsapp_uses_content_template() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(MESSAGES_PATH)
                .x_www_form_urlencoded_tuple("To", "whatsapp:+9647701234567")
                .x_www_form_urlencoded_tuple("From", "whatsapp:+15550002222")
                .x_www_form_urlencoded_tuple("ContentSid", "HXotp")
                .x_www_form_urlencoded_tuple("ContentVariables", r#"{"1":"482913"}"#);
            then.status(201).json_body(queued("SM0002"));
        })
        .await;

    let mut config = config(&server);
    config.whatsapp_from = Some("+15550002222".to_string());
    config.whatsapp_content_sid = Some("HXotp".to_string());
    let adapter = TwilioMessagingAdapter::new(config).unwrap();

    let reference = adapter
        .send(&test_phone(), "482913", Channel::Whatsapp, None)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(reference, "SM0002");
}

#[tokio::test]
async fn test_messaging_service_hint() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(MESSAGES_PATH)
                .x_www_form_urlencoded_tuple("MessagingServiceSid", "MGiraq");
            then.status(201).json_body(queued("SM0003"));
        })
        .await;

    let adapter = TwilioMessagingAdapter::new(config(&server)).unwrap();
    adapter
        .send(&test_phone(), "482913", Channel::Sms, Some("MGiraq"))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_content_filter_error_is_classified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(MESSAGES_PATH);
            then.status(400).json_body(json!({
                "code": 30007,
                "message": "Message filtered",
                "status": 400
            }));
        })
        .await;

    let adapter = TwilioMessagingAdapter::new(config(&server)).unwrap();
    let err = adapter
        .send(&test_phone(), "482913", Channel::Sms, None)
        .await
        .unwrap_err();

    assert_eq!(err.class, FailureClass::ContentBlocked);
    assert!(err.class.is_known_rejection());
}

const UNDELIVERED_SID: &str = "SM0123456789abcdef0123456789abcdef";
const DELIVERED_SID: &str = "MMfedcba9876543210fedcba9876543210";

#[tokio::test]
async fn test_fetch_status_undelivered() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!(
                "/2010-04-01/Accounts/ACtest/Messages/{}.json",
                UNDELIVERED_SID
            ));
            then.status(200).json_body(json!({
                "sid": UNDELIVERED_SID,
                "status": "undelivered",
                "error_code": 30003,
                "error_message": "Unreachable destination handset"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!(
                "/2010-04-01/Accounts/ACtest/Messages/{}.json",
                DELIVERED_SID
            ));
            then.status(200).json_body(json!({
                "sid": DELIVERED_SID,
                "status": "delivered",
                "error_code": null,
                "error_message": null
            }));
        })
        .await;

    let adapter = TwilioMessagingAdapter::new(config(&server)).unwrap();

    assert_eq!(
        adapter.fetch_status(UNDELIVERED_SID).await.unwrap(),
        DeliveryStatus::Undelivered(
            "30003 (carrier_rejected): Unreachable destination handset".to_string()
        )
    );
    assert_eq!(
        adapter.fetch_status(DELIVERED_SID).await.unwrap(),
        DeliveryStatus::Delivered
    );
}

#[tokio::test]
async fn test_fetch_status_rejects_non_message_references() {
    let server = MockServer::start_async().await;
    let other_resource = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({
                "sid": "CA1",
                "status": "completed",
                "error_code": null,
                "error_message": null
            }));
        })
        .await;

    let adapter = TwilioMessagingAdapter::new(config(&server)).unwrap();

    for reference in [
        "../Calls/CA1",
        "SM0001",
        "CA0123456789abcdef0123456789abcdef",
        "SM0123456789abcdef0123456789abcdef/../../Calls",
        "SM0123456789ABCDEF0123456789ABCDEF",
        "",
    ] {
        let err = adapter.fetch_status(reference).await.unwrap_err();
        assert_eq!(
            err.class,
            FailureClass::Unknown("invalid_reference".to_string()),
            "reference {:?}",
            reference
        );
    }

    other_resource.assert_hits_async(0).await;
}

#[test]
fn test_supported_channels_follow_senders() {
    let server = MockServer::start();
    let sms_only = TwilioMessagingAdapter::new(config(&server)).unwrap();
    assert!(sms_only.supports(Channel::Sms));
    assert!(!sms_only.supports(Channel::Whatsapp));

    let mut no_sender = config(&server);
    no_sender.from = None;
    assert!(TwilioMessagingAdapter::new(no_sender).is_err());
}
