//! Periodic sweep over blob/record pairs.
//!
//! Uploads write the blob before the record, and deletions remove the blob
//! before the record, so a crash or a failed database write can leave either
//! side behind. The sweep deletes blobs no record points at once they are older
//! than the grace period, and reports records whose blob is gone.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tripmedia_core::AppError;
use tripmedia_db::MediaStore;
use tripmedia_storage::{Storage, MEDIA_PREFIX};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Orphan blobs removed in this run
    pub deleted_orphans: Vec<String>,
    /// Orphan blobs still inside the grace period
    pub pending_orphans: usize,
    /// Orphan blobs whose deletion failed; retried next run
    pub failed_deletions: usize,
    /// Records whose blob is missing. Reported only.
    pub dangling_records: Vec<String>,
}

#[derive(Clone)]
pub struct ReconciliationService {
    media: Arc<dyn MediaStore>,
    storage: Arc<dyn Storage>,
    grace: Duration,
}

impl ReconciliationService {
    pub fn new(media: Arc<dyn MediaStore>, storage: Arc<dyn Storage>, grace: Duration) -> Self {
        Self {
            media,
            storage,
            grace,
        }
    }

    /// Start the background sweep. Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(every);

            loop {
                sweep_interval.tick().await;

                tracing::info!("Starting blob/record reconciliation");

                match self.run_once().await {
                    Ok(report) => tracing::info!(
                        deleted = report.deleted_orphans.len(),
                        pending = report.pending_orphans,
                        failed = report.failed_deletions,
                        dangling = report.dangling_records.len(),
                        "Reconciliation completed"
                    ),
                    Err(e) => tracing::error!(error = %e, "Reconciliation failed"),
                }
            }
        })
    }

    #[tracing::instrument(skip(self), fields(reconciliation.grace_secs = self.grace.as_secs()))]
    pub async fn run_once(&self) -> Result<ReconciliationReport, AppError> {
        // Records first: a pair created after this point shows up as a young
        // orphan blob, which the grace period protects.
        let known: HashSet<String> = self.media.list_storage_keys().await?.into_iter().collect();

        let blobs = self
            .storage
            .list(MEDIA_PREFIX)
            .await
            .map_err(|e| AppError::BlobStoreUnavailable(e.to_string()))?;

        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.grace).unwrap_or_else(|_| chrono::Duration::zero());

        let mut report = ReconciliationReport::default();
        let mut present = HashSet::with_capacity(blobs.len());

        for blob in blobs {
            if known.contains(&blob.key) {
                present.insert(blob.key);
                continue;
            }

            if blob.last_modified > cutoff {
                report.pending_orphans += 1;
                continue;
            }

            match self.storage.delete(&blob.key).await {
                Ok(()) => {
                    tracing::info!(storage_key = %blob.key, size_bytes = blob.size, "Deleted orphan blob");
                    report.deleted_orphans.push(blob.key);
                }
                Err(e) => {
                    tracing::error!(error = %e, storage_key = %blob.key, "Failed to delete orphan blob");
                    report.failed_deletions += 1;
                }
            }
        }

        let mut dangling: Vec<String> = known.difference(&present).cloned().collect();
        dangling.sort();
        for key in &dangling {
            tracing::warn!(storage_key = %key, "Media record has no blob");
        }
        report.dangling_records = dangling;

        Ok(report)
    }
}
