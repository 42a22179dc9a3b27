//! Redis-backed verification store
//!
//! One hash per phone at `<prefix>:otp:<phone>` with the fields `code`,
//! `created_at`, `expires_at` (epoch milliseconds) and `attempts`. Both
//! mutations are Lua scripts so the read-compare-write runs atomically on the
//! server. The key outlives the code by the configured retention so a stale
//! code is reported as `expired` instead of `not_found`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::{ErrorKind, RedisError, Script};
use tracing::{debug, error, info};

use mazad_core::{CanonicalPhone, StoreError, VerificationRecord, VerificationStore, VerifyOutcome};
use mazad_shared::utils::mask_phone_number;

use super::RedisClient;

/// KEYS[1] record; ARGV: code, created_ms, expires_ms, evict_at_ms
const UPSERT_SCRIPT: &str = r#"
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1], 'code', ARGV[1], 'created_at', ARGV[2], 'expires_at', ARGV[3], 'attempts', 0)
redis.call('PEXPIREAT', KEYS[1], ARGV[4])
return 'ok'
"#;

/// KEYS[1] record; ARGV: submitted, now_ms, max_attempts (0 = unlimited)
const CONSUME_SCRIPT: &str = r#"
local rec = redis.call('HMGET', KEYS[1], 'code', 'expires_at')
if not rec[1] then
  return 'not_found'
end
if tonumber(ARGV[2]) >= tonumber(rec[2]) then
  redis.call('DEL', KEYS[1])
  return 'expired'
end
if rec[1] == ARGV[1] then
  redis.call('DEL', KEYS[1])
  return 'valid'
end
local attempts = redis.call('HINCRBY', KEYS[1], 'attempts', 1)
local max = tonumber(ARGV[3])
if max > 0 and attempts >= max then
  redis.call('DEL', KEYS[1])
  return 'attempts_exceeded'
end
return 'invalid_code'
"#;

/// KEYS[1] record; ARGV: cutoff_ms
const PURGE_SCRIPT: &str = r#"
local exp = redis.call('HGET', KEYS[1], 'expires_at')
if exp and tonumber(exp) <= tonumber(ARGV[1]) then
  redis.call('DEL', KEYS[1])
  return 1
end
return 0
"#;

/// Keys fetched per SCAN round during purges
const SCAN_BATCH: usize = 200;

/// Verification store kept in Redis hashes
pub struct RedisVerificationStore {
    client: RedisClient,
    max_attempts: u32,
    retention: Duration,
    upsert_script: Script,
    consume_script: Script,
    purge_script: Script,
}

impl RedisVerificationStore {
    /// Create a store on top of an existing client
    ///
    /// # Arguments
    /// * `client` - Connected Redis client
    /// * `max_attempts` - Mismatches before the record is dropped (`0` disables)
    /// * `retention` - How long an expired record is kept to report `expired`
    pub fn new(client: RedisClient, max_attempts: u32, retention: Duration) -> Self {
        Self {
            client,
            max_attempts,
            retention,
            upsert_script: Script::new(UPSERT_SCRIPT),
            consume_script: Script::new(CONSUME_SCRIPT),
            purge_script: Script::new(PURGE_SCRIPT),
        }
    }

    fn record_key(&self, phone: &CanonicalPhone) -> String {
        self.client.make_key(&record_suffix(phone))
    }
}

pub(crate) fn record_suffix(phone: &CanonicalPhone) -> String {
    format!("otp:{}", phone.as_str())
}

#[async_trait]
impl VerificationStore for RedisVerificationStore {
    async fn upsert(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        ttl: Duration,
    ) -> Result<VerificationRecord, StoreError> {
        let record = VerificationRecord::new(phone.clone(), code, ttl, Utc::now());
        let expires_ms = record.expires_at.timestamp_millis();
        let evict_at_ms = expires_ms + self.retention.num_milliseconds();

        let mut conn = self.client.connection();
        let _: String = self
            .upsert_script
            .key(self.record_key(phone))
            .arg(code)
            .arg(record.created_at.timestamp_millis())
            .arg(expires_ms)
            .arg(evict_at_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                error!(phone = %mask_phone_number(phone.as_str()), "Failed to store verification code: {}", e);
                store_error(e)
            })?;

        debug!(phone = %mask_phone_number(phone.as_str()), "Verification code stored in Redis");
        Ok(record)
    }

    async fn consume(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, StoreError> {
        let mut conn = self.client.connection();
        let reply: String = self
            .consume_script
            .key(self.record_key(phone))
            .arg(code)
            .arg(now.timestamp_millis())
            .arg(self.max_attempts)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                error!(phone = %mask_phone_number(phone.as_str()), "Failed to consume verification code: {}", e);
                store_error(e)
            })?;

        parse_outcome(&reply)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let pattern = self.client.make_key("otp:*");
        let cutoff_ms = cutoff.timestamp_millis();
        let mut conn = self.client.connection();
        let mut cursor: u64 = 0;
        let mut purged = 0u64;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(store_error)?;

            for key in keys {
                let removed: i64 = self
                    .purge_script
                    .key(key)
                    .arg(cutoff_ms)
                    .invoke_async(&mut conn)
                    .await
                    .map_err(store_error)?;
                purged += removed as u64;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        if purged > 0 {
            info!(purged, "Purged expired verification records from Redis");
        }
        Ok(purged)
    }
}

pub(crate) fn parse_outcome(reply: &str) -> Result<VerifyOutcome, StoreError> {
    match reply {
        "valid" => Ok(VerifyOutcome::Valid),
        "invalid_code" => Ok(VerifyOutcome::InvalidCode),
        "expired" => Ok(VerifyOutcome::Expired),
        "not_found" => Ok(VerifyOutcome::NotFound),
        "attempts_exceeded" => Ok(VerifyOutcome::AttemptsExceeded),
        other => Err(StoreError::internal(format!(
            "unexpected consume script reply: {}",
            other
        ))),
    }
}

/// Connectivity problems are `Unavailable`; anything else is internal
pub(crate) fn store_error(err: RedisError) -> StoreError {
    let unavailable = err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
        || matches!(err.kind(), ErrorKind::BusyLoadingError | ErrorKind::TryAgain);

    if unavailable {
        StoreError::unavailable(err.to_string())
    } else {
        StoreError::internal(err.to_string())
    }
}
