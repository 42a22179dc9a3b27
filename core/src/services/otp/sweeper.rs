//! Background purge of expired verification records
//!
//! Expired records are already removed lazily on verification; the sweep only
//! reclaims codes nobody ever tried to verify. A record survives its expiry by
//! the retention window so late verifications still report `expired`.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::StoreError;
use crate::repositories::VerificationStore;

/// Periodically calls `purge_expired` on a store
pub struct ExpirySweeper {
    store: Arc<dyn VerificationStore>,
    interval: Duration,
    retention: chrono::Duration,
    enabled: bool,
}

/// Result of a sweep cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepResult {
    /// Number of expired records deleted
    pub purged: u64,
}

impl ExpirySweeper {
    pub fn new(
        store: Arc<dyn VerificationStore>,
        interval: Duration,
        retention: chrono::Duration,
        enabled: bool,
    ) -> Self {
        Self {
            store,
            interval,
            retention,
            enabled,
        }
    }

    /// Run a single sweep cycle
    pub async fn run_once(&self) -> Result<SweepResult, StoreError> {
        if !self.enabled {
            return Ok(SweepResult::default());
        }

        let cutoff = Utc::now() - self.retention;
        let purged = self.store.purge_expired(cutoff).await?;
        if purged > 0 {
            info!(purged, event = "otp_sweep", "Purged expired verification codes");
        } else {
            debug!(event = "otp_sweep", "No expired verification codes to purge");
        }
        Ok(SweepResult { purged })
    }

    /// Start the sweeper as a background task
    ///
    /// Failures are logged and the loop keeps running. Returns `None` when disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.enabled {
            warn!("Expiry sweeper is disabled");
            return None;
        }

        let handle = tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                "Expiry sweeper started"
            );

            let mut interval_timer = tokio::time::interval(self.interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_once().await {
                    error!(error = %e, "Expiry sweep failed");
                }
            }
        });

        Some(handle)
    }
}
