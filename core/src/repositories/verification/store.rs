//! Verification store trait: persistence for outstanding codes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::{CanonicalPhone, VerificationRecord, VerifyOutcome};
use crate::errors::StoreError;

/// Holds at most one outstanding verification record per canonical phone.
///
/// Both `upsert` and `consume` must be atomic at the storage layer: concurrent
/// sends for the same phone leave exactly one record (last writer wins), and
/// two concurrent verifications can never both observe a valid code.
///
/// Backend outages are reported as [`StoreError::Unavailable`], never as
/// [`VerifyOutcome::NotFound`].
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Create or replace the record for `phone`, resetting its attempt counter
    ///
    /// # Returns
    /// * `Ok(VerificationRecord)` - The record as stored
    /// * `Err(StoreError)` - Backend failure
    async fn upsert(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        ttl: Duration,
    ) -> Result<VerificationRecord, StoreError>;

    /// Atomically read, compare and (when the outcome requires it) delete.
    ///
    /// * `Valid` - record deleted
    /// * `Expired` - record deleted
    /// * `InvalidCode` - attempt counter incremented
    /// * `AttemptsExceeded` - counter reached the maximum, record deleted
    /// * `NotFound` - nothing outstanding
    async fn consume(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, StoreError>;

    /// Delete every record whose expiry is at or before `cutoff`
    ///
    /// Callers pass a cutoff behind the current time by the retention window
    /// so recently expired codes keep reporting `Expired`.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records removed
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
