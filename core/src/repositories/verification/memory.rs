//! In-process verification store for development and tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{CanonicalPhone, VerificationRecord, VerifyOutcome};
use crate::errors::StoreError;

use super::VerificationStore;

/// Mutex-guarded map; every operation holds the lock for its whole
/// read-compare-write, which makes it atomic
pub struct InMemoryVerificationStore {
    records: Mutex<HashMap<String, VerificationRecord>>,
    max_attempts: u32,
}

impl InMemoryVerificationStore {
    /// `max_attempts == 0` disables the mismatch lockout
    pub fn new(max_attempts: u32) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            max_attempts,
        }
    }

    /// Current record for a phone, if any
    pub fn get(&self, phone: &CanonicalPhone) -> Option<VerificationRecord> {
        self.lock().ok()?.get(phone.as_str()).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, VerificationRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::internal("verification store lock poisoned"))
    }
}

impl Default for InMemoryVerificationStore {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl VerificationStore for InMemoryVerificationStore {
    async fn upsert(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        ttl: Duration,
    ) -> Result<VerificationRecord, StoreError> {
        let record = VerificationRecord::new(phone.clone(), code, ttl, Utc::now());
        self.lock()?.insert(phone.as_str().to_string(), record.clone());
        Ok(record)
    }

    async fn consume(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, StoreError> {
        let mut records = self.lock()?;

        let Some(record) = records.get_mut(phone.as_str()) else {
            return Ok(VerifyOutcome::NotFound);
        };

        let outcome = record.check(code, now, self.max_attempts);
        if outcome.removes_record() {
            records.remove(phone.as_str());
        }
        Ok(outcome)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(cutoff));
        Ok((before - records.len()) as u64)
    }
}
