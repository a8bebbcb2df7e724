// ==========================================
// Product Catalog Import - Job Lifecycle Tracker
// ==========================================
// Responsibility: drive the job ledger through its status transitions
// Lifecycle: QUEUED -> PROCESSING -> COMPLETED / FAILED / CANCELLED
// Red line: ledger failures are structural; a run that cannot record its
// own disposition must not pretend it succeeded
// ==========================================

use crate::domain::import::{ImportJob, RowOutcome};
use crate::domain::types::JobStatus;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::import_job_repo::ImportJobRepository;
use chrono::Utc;
use tracing::info;

// ==========================================
// JobLifecycleTracker
// ==========================================
pub struct JobLifecycleTracker<'a> {
    ledger: &'a dyn ImportJobRepository,
    job_id: String,
}

impl<'a> JobLifecycleTracker<'a> {
    /// Register a fresh QUEUED job and start tracking it
    pub async fn register(
        ledger: &'a dyn ImportJobRepository,
        job: &ImportJob,
    ) -> ImportResult<JobLifecycleTracker<'a>> {
        ledger
            .create_job(job)
            .await
            .map_err(|e| ImportError::LedgerError(e.to_string()))?;
        info!("job {} registered (QUEUED)", job.job_id);
        Ok(Self {
            ledger,
            job_id: job.job_id.clone(),
        })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// QUEUED -> PROCESSING, stamping started_at
    pub async fn start(&self, phase: &str) -> ImportResult<()> {
        self.ledger
            .set_status(&self.job_id, JobStatus::Processing, phase)
            .await
            .map_err(|e| ImportError::LedgerError(e.to_string()))
    }

    /// Update the phase text while PROCESSING
    pub async fn phase(&self, phase: &str) -> ImportResult<()> {
        self.ledger
            .set_status(&self.job_id, JobStatus::Processing, phase)
            .await
            .map_err(|e| ImportError::LedgerError(e.to_string()))
    }

    /// Record one per-row disposition
    pub async fn record_outcome(&self, outcome: &RowOutcome) -> ImportResult<()> {
        self.ledger
            .record_row_outcome(&self.job_id, outcome)
            .await
            .map_err(|e| ImportError::LedgerError(e.to_string()))
    }

    /// Progress snapshot, pushed at chunk boundaries
    pub async fn snapshot(
        &self,
        processed_rows: usize,
        success_rows: usize,
        error_rows: usize,
    ) -> ImportResult<()> {
        self.ledger
            .update_progress(&self.job_id, processed_rows, success_rows, error_rows)
            .await
            .map_err(|e| ImportError::LedgerError(e.to_string()))
    }

    /// Cancellation flag, checked before each chunk opens
    pub async fn cancel_requested(&self) -> ImportResult<bool> {
        self.ledger
            .is_cancel_requested(&self.job_id)
            .await
            .map_err(|e| ImportError::LedgerError(e.to_string()))
    }

    /// Final transition
    ///
    /// COMPLETED covers any number of row failures; FAILED is reserved for
    /// structural errors, CANCELLED for a honored cancellation flag.
    pub async fn finish(&self, status: JobStatus, phase: &str) -> ImportResult<()> {
        self.ledger
            .complete(&self.job_id, status, Utc::now(), phase)
            .await
            .map_err(|e| ImportError::LedgerError(e.to_string()))?;
        info!("job {} finished ({})", self.job_id, status.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::import_job_repo_impl::ImportJobRepositoryImpl;
    use crate::repository::schema::init_schema;
    use std::sync::{Arc, Mutex};

    fn ledger() -> ImportJobRepositoryImpl {
        let conn = crate::db::open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        ImportJobRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_full_transition_sequence() {
        let ledger = ledger();
        let job = ImportJob::new("t1", Some("file.csv".to_string()), None);
        let tracker = JobLifecycleTracker::register(&ledger, &job).await.unwrap();

        tracker.start("detecting header").await.unwrap();
        tracker.snapshot(10, 8, 2).await.unwrap();
        tracker.finish(JobStatus::Completed, "done").await.unwrap();

        let record = ledger.get_job(&job.job_id).await.unwrap().unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.processed_rows, 10);
        assert_eq!(record.success_rows, 8);
        assert_eq!(record.error_rows, 2);
        assert!(record.started_at.is_some());
        assert!(record.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_cancellation_flag_visible_to_tracker() {
        let ledger = ledger();
        let job = ImportJob::new("t1", None, None);
        let tracker = JobLifecycleTracker::register(&ledger, &job).await.unwrap();

        assert!(!tracker.cancel_requested().await.unwrap());
        ledger.request_cancel(&job.job_id).await.unwrap();
        assert!(tracker.cancel_requested().await.unwrap());
    }
}
