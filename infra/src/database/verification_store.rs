//! MySQL-backed verification store
//!
//! Uses the `phone_verifications` table (phone is the primary key). `upsert`
//! is a single `INSERT ... ON DUPLICATE KEY UPDATE`; `consume` locks the row
//! with `SELECT ... FOR UPDATE` inside a transaction before deleting it or
//! bumping the attempt counter.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{MySql, Pool, Row};
use tracing::{debug, error, info};

use mazad_core::{CanonicalPhone, StoreError, VerificationRecord, VerificationStore, VerifyOutcome};
use mazad_shared::utils::mask_phone_number;

/// Verification store on a MySQL table
pub struct MySqlVerificationStore {
    /// Database connection pool
    pool: Pool<MySql>,
    max_attempts: u32,
}

impl MySqlVerificationStore {
    /// Create a new store
    ///
    /// `max_attempts` of `0` disables the mismatch lockout.
    pub fn new(pool: Pool<MySql>, max_attempts: u32) -> Self {
        Self { pool, max_attempts }
    }
}

#[async_trait]
impl VerificationStore for MySqlVerificationStore {
    async fn upsert(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        ttl: Duration,
    ) -> Result<VerificationRecord, StoreError> {
        let record = VerificationRecord::new(phone.clone(), code, ttl, Utc::now());

        let query = r#"
            INSERT INTO phone_verifications (phone, code, attempts, expires_at, created_at)
            VALUES (?, ?, 0, ?, ?)
            ON DUPLICATE KEY UPDATE
                code = VALUES(code),
                attempts = 0,
                expires_at = VALUES(expires_at),
                created_at = VALUES(created_at)
        "#;

        sqlx::query(query)
            .bind(phone.as_str())
            .bind(&record.code)
            .bind(record.expires_at)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    phone = %mask_phone_number(phone.as_str()),
                    error = %e,
                    "Failed to store verification code"
                );
                store_error(e)
            })?;

        debug!(phone = %mask_phone_number(phone.as_str()), "Verification code stored in database");
        Ok(record)
    }

    async fn consume(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let row = sqlx::query(
            r#"
            SELECT code, attempts, expires_at, created_at
            FROM phone_verifications
            WHERE phone = ?
            FOR UPDATE
            "#,
        )
        .bind(phone.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!(
                phone = %mask_phone_number(phone.as_str()),
                error = %e,
                "Failed to load verification record"
            );
            store_error(e)
        })?;

        let Some(row) = row else {
            tx.rollback().await.map_err(store_error)?;
            return Ok(VerifyOutcome::NotFound);
        };

        let mut record = VerificationRecord {
            phone: phone.clone(),
            code: row.try_get("code").map_err(decode_error)?,
            created_at: row.try_get("created_at").map_err(decode_error)?,
            expires_at: row.try_get("expires_at").map_err(decode_error)?,
            attempts: row.try_get("attempts").map_err(decode_error)?,
        };

        let outcome = record.check(code, now, self.max_attempts);

        if outcome.removes_record() {
            sqlx::query("DELETE FROM phone_verifications WHERE phone = ?")
                .bind(phone.as_str())
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
        } else {
            sqlx::query("UPDATE phone_verifications SET attempts = ? WHERE phone = ?")
                .bind(record.attempts)
                .bind(phone.as_str())
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
        }

        tx.commit().await.map_err(store_error)?;

        debug!(
            phone = %mask_phone_number(phone.as_str()),
            outcome = outcome.as_str(),
            "Verification record consumed"
        );
        Ok(outcome)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM phone_verifications WHERE expires_at <= ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        let purged = result.rows_affected();
        if purged > 0 {
            info!(purged, "Purged expired verification records from database");
        }
        Ok(purged)
    }
}

fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::internal(format!("corrupt verification record: {}", err))
}

/// Pool and transport failures are `Unavailable`; anything else is internal
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::unavailable(err.to_string()),
        _ => StoreError::internal(err.to_string()),
    }
}
