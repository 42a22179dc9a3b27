//! Integration tests for the Redis verification store
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p mazad_infra --test redis_store_integration -- --ignored

use chrono::{Duration, Utc};
use std::sync::Arc;

use mazad_core::{CanonicalPhone, PhoneNormalizer, VerificationStore, VerifyOutcome};
use mazad_infra::cache::{CacheConfig, RedisClient, RedisVerificationStore};

async fn store(max_attempts: u32) -> RedisVerificationStore {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let client = RedisClient::connect(CacheConfig::new(url).with_prefix("mazad-test"))
        .await
        .expect("Failed to connect to Redis");
    RedisVerificationStore::new(client, max_attempts, Duration::hours(1))
}

fn phone(raw: &str) -> CanonicalPhone {
    PhoneNormalizer::new("964", 9, 10).unwrap().normalize(raw).unwrap()
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_upsert_then_consume_once() {
    let store = store(5).await;
    let p = phone("07700000001");

    store.upsert(&p, "111111", Duration::minutes(5)).await.unwrap();
    assert_eq!(
        store.consume(&p, "111111", Utc::now()).await.unwrap(),
        VerifyOutcome::Valid
    );
    assert_eq!(
        store.consume(&p, "111111", Utc::now()).await.unwrap(),
        VerifyOutcome::NotFound
    );
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_reissue_invalidates_previous_code() {
    let store = store(5).await;
    let p = phone("07700000002");

    store.upsert(&p, "111111", Duration::minutes(5)).await.unwrap();
    store.upsert(&p, "222222", Duration::minutes(5)).await.unwrap();

    assert_eq!(
        store.consume(&p, "111111", Utc::now()).await.unwrap(),
        VerifyOutcome::InvalidCode
    );
    assert_eq!(
        store.consume(&p, "222222", Utc::now()).await.unwrap(),
        VerifyOutcome::Valid
    );
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_expired_is_distinct_from_not_found() {
    let store = store(5).await;
    let p = phone("07700000003");

    store.upsert(&p, "333333", Duration::minutes(5)).await.unwrap();
    let later = Utc::now() + Duration::minutes(6);

    assert_eq!(
        store.consume(&p, "333333", later).await.unwrap(),
        VerifyOutcome::Expired
    );
    assert_eq!(
        store.consume(&p, "333333", later).await.unwrap(),
        VerifyOutcome::NotFound
    );
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_attempt_lockout() {
    let store = store(2).await;
    let p = phone("07700000004");

    store.upsert(&p, "444444", Duration::minutes(5)).await.unwrap();
    assert_eq!(
        store.consume(&p, "000000", Utc::now()).await.unwrap(),
        VerifyOutcome::InvalidCode
    );
    assert_eq!(
        store.consume(&p, "000000", Utc::now()).await.unwrap(),
        VerifyOutcome::AttemptsExceeded
    );
    assert_eq!(
        store.consume(&p, "444444", Utc::now()).await.unwrap(),
        VerifyOutcome::NotFound
    );
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_concurrent_consume_yields_single_valid() {
    let store = Arc::new(store(5).await);
    let p = phone("07700000005");
    store.upsert(&p, "555555", Duration::minutes(5)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let p = p.clone();
        handles.push(tokio::spawn(async move {
            store.consume(&p, "555555", Utc::now()).await.unwrap()
        }));
    }

    let mut valid = 0;
    for handle in handles {
        if handle.await.unwrap() == VerifyOutcome::Valid {
            valid += 1;
        }
    }
    assert_eq!(valid, 1);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_purge_expired() {
    let store = store(5).await;
    let p = phone("07700000006");

    store.upsert(&p, "666666", Duration::minutes(5)).await.unwrap();
    let purged = store.purge_expired(Utc::now() + Duration::minutes(10)).await.unwrap();
    assert!(purged >= 1);
    assert_eq!(
        store.consume(&p, "666666", Utc::now()).await.unwrap(),
        VerifyOutcome::NotFound
    );
}
