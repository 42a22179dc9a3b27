//! Unit tests for the expiry sweeper

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::domain::{CanonicalPhone, VerifyOutcome};
use crate::repositories::{InMemoryVerificationStore, VerificationStore};
use crate::services::otp::{ExpirySweeper, SweepResult};

const INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

fn sweeper(store: Arc<InMemoryVerificationStore>, enabled: bool) -> ExpirySweeper {
    ExpirySweeper::new(store, INTERVAL, Duration::hours(1), enabled)
}

#[tokio::test]
async fn test_run_once_purges_records_past_retention() {
    let store = Arc::new(InMemoryVerificationStore::new(5));
    store
        .upsert(&CanonicalPhone::new("964", "7701234567"), "111111", Duration::hours(-2))
        .await
        .unwrap();
    store
        .upsert(&CanonicalPhone::new("964", "7701234568"), "222222", Duration::minutes(5))
        .await
        .unwrap();

    let result = sweeper(store.clone(), true).run_once().await.unwrap();

    assert_eq!(result, SweepResult { purged: 1 });
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_recently_expired_code_still_reports_expired_after_sweep() {
    let store = Arc::new(InMemoryVerificationStore::new(5));
    let phone = CanonicalPhone::new("964", "7701234567");
    store.upsert(&phone, "111111", Duration::zero()).await.unwrap();

    let result = sweeper(store.clone(), true).run_once().await.unwrap();
    assert_eq!(result.purged, 0);

    assert_eq!(
        store.consume(&phone, "111111", Utc::now()).await.unwrap(),
        VerifyOutcome::Expired
    );
}

#[tokio::test]
async fn test_disabled_sweeper_does_nothing() {
    let store = Arc::new(InMemoryVerificationStore::new(5));
    store
        .upsert(&CanonicalPhone::new("964", "7701234567"), "111111", Duration::hours(-2))
        .await
        .unwrap();

    let sweeper = Arc::new(sweeper(store.clone(), false));
    assert_eq!(sweeper.run_once().await.unwrap().purged, 0);
    assert!(sweeper.start_background_task().is_none());
    assert_eq!(store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_background_task_sweeps_on_interval() {
    let store = Arc::new(InMemoryVerificationStore::new(5));
    store
        .upsert(&CanonicalPhone::new("964", "7701234567"), "111111", Duration::hours(-2))
        .await
        .unwrap();

    let sweeper = Arc::new(sweeper(store.clone(), true));
    let handle = sweeper.start_background_task().unwrap();

    // First tick fires immediately
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    assert!(store.is_empty());

    handle.abort();
}
