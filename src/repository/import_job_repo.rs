// ==========================================
// Product Catalog Import - Import Job Repository Trait
// ==========================================
// Responsibility: job ledger consumed by the import pipeline
// Red line: status transitions only, no pipeline logic
// ==========================================

use crate::domain::import::{ImportJob, RowOutcome};
use crate::domain::types::JobStatus;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// ==========================================
// ImportJobRepository Trait
// ==========================================
// Implementor: ImportJobRepositoryImpl (rusqlite)
#[async_trait]
pub trait ImportJobRepository: Send + Sync {
    /// Register a new job (status QUEUED)
    async fn create_job(&self, job: &ImportJob) -> RepositoryResult<()>;

    /// Transition the job status and phase text
    ///
    /// Entering PROCESSING stamps started_at.
    async fn set_status(
        &self,
        job_id: &str,
        status: JobStatus,
        phase: &str,
    ) -> RepositoryResult<()>;

    /// Final transition with end timestamp
    async fn complete(
        &self,
        job_id: &str,
        status: JobStatus,
        finished_at: DateTime<Utc>,
        phase: &str,
    ) -> RepositoryResult<()>;

    /// Record one per-row disposition
    async fn record_row_outcome(
        &self,
        job_id: &str,
        outcome: &RowOutcome,
    ) -> RepositoryResult<()>;

    /// Periodic progress snapshot (called at chunk boundaries)
    async fn update_progress(
        &self,
        job_id: &str,
        processed_rows: usize,
        success_rows: usize,
        error_rows: usize,
    ) -> RepositoryResult<()>;

    /// Flag the job for cancellation (honored at the next chunk boundary)
    async fn request_cancel(&self, job_id: &str) -> RepositoryResult<()>;

    /// Cancellation flag, checked before each chunk starts
    async fn is_cancel_requested(&self, job_id: &str) -> RepositoryResult<bool>;

    /// Fetch a job record
    async fn get_job(&self, job_id: &str) -> RepositoryResult<Option<ImportJob>>;
}
