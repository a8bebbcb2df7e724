// ==========================================
// Product Catalog Import - Import Job Repository (rusqlite)
// ==========================================
// Responsibility: SQLite-backed job ledger
// Note: shares the catalog connection inside one process so ledger writes
// participate in the open chunk transaction instead of blocking on it
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import::{ImportJob, RowOutcome};
use crate::domain::types::JobStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_job_repo::ImportJobRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// ImportJobRepositoryImpl
// ==========================================
pub struct ImportJobRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportJobRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::LockError("connection mutex poisoned".to_string()))
    }

    fn map_job_row(row: &Row<'_>) -> rusqlite::Result<ImportJob> {
        let status: String = row.get("status")?;
        let file_size: Option<i64> = row.get("file_size")?;
        let total_rows: i64 = row.get("total_rows")?;
        let processed_rows: i64 = row.get("processed_rows")?;
        let success_rows: i64 = row.get("success_rows")?;
        let error_rows: i64 = row.get("error_rows")?;

        Ok(ImportJob {
            job_id: row.get("job_id")?,
            tenant_id: row.get("tenant_id")?,
            status: JobStatus::from_str_db(&status),
            phase: row.get("phase")?,
            file_name: row.get("file_name")?,
            file_size: file_size.map(|s| s as u64),
            total_rows: total_rows as usize,
            processed_rows: processed_rows as usize,
            success_rows: success_rows as usize,
            error_rows: error_rows as usize,
            started_at: row.get("started_at")?,
            finished_at: row.get("finished_at")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[async_trait]
impl ImportJobRepository for ImportJobRepositoryImpl {
    async fn create_job(&self, job: &ImportJob) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_jobs (
                job_id, tenant_id, status, phase, file_name, file_size,
                total_rows, processed_rows, success_rows, error_rows,
                cancel_requested, started_at, finished_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11, ?12, ?13)
            "#,
            params![
                job.job_id,
                job.tenant_id,
                job.status.as_str(),
                job.phase,
                job.file_name,
                job.file_size.map(|s| s as i64),
                job.total_rows as i64,
                job.processed_rows as i64,
                job.success_rows as i64,
                job.error_rows as i64,
                job.started_at,
                job.finished_at,
                job.created_at,
            ],
        )?;
        Ok(())
    }

    async fn set_status(
        &self,
        job_id: &str,
        status: JobStatus,
        phase: &str,
    ) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let affected = if status == JobStatus::Processing {
            conn.execute(
                "UPDATE import_jobs SET status = ?2, phase = ?3, started_at = COALESCE(started_at, ?4) WHERE job_id = ?1",
                params![job_id, status.as_str(), phase, Utc::now()],
            )?
        } else {
            conn.execute(
                "UPDATE import_jobs SET status = ?2, phase = ?3 WHERE job_id = ?1",
                params![job_id, status.as_str(), phase],
            )?
        };

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ImportJob".to_string(),
                id: job_id.to_string(),
            });
        }
        Ok(())
    }

    async fn complete(
        &self,
        job_id: &str,
        status: JobStatus,
        finished_at: DateTime<Utc>,
        phase: &str,
    ) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE import_jobs SET status = ?2, finished_at = ?3, phase = ?4 WHERE job_id = ?1",
            params![job_id, status.as_str(), finished_at, phase],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ImportJob".to_string(),
                id: job_id.to_string(),
            });
        }
        Ok(())
    }

    async fn record_row_outcome(
        &self,
        job_id: &str,
        outcome: &RowOutcome,
    ) -> RepositoryResult<()> {
        let errors_json = serde_json::to_string(&outcome.errors)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_row_outcomes (
                outcome_id, job_id, row_number, data_row_number, success,
                product_id, product_code, errors_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                Uuid::new_v4().to_string(),
                job_id,
                outcome.row_number as i64,
                outcome.data_row_number as i64,
                outcome.success as i32,
                outcome.product_id,
                outcome.product_code,
                errors_json,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    async fn update_progress(
        &self,
        job_id: &str,
        processed_rows: usize,
        success_rows: usize,
        error_rows: usize,
    ) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            UPDATE import_jobs
            SET total_rows = ?2, processed_rows = ?2, success_rows = ?3, error_rows = ?4
            WHERE job_id = ?1
            "#,
            params![
                job_id,
                processed_rows as i64,
                success_rows as i64,
                error_rows as i64,
            ],
        )?;
        Ok(())
    }

    async fn request_cancel(&self, job_id: &str) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE import_jobs SET cancel_requested = 1 WHERE job_id = ?1",
            params![job_id],
        )?;
        Ok(())
    }

    async fn is_cancel_requested(&self, job_id: &str) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let flag: Option<i64> = conn
            .query_row(
                "SELECT cancel_requested FROM import_jobs WHERE job_id = ?1",
                params![job_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(flag.unwrap_or(0) != 0)
    }

    async fn get_job(&self, job_id: &str) -> RepositoryResult<Option<ImportJob>> {
        let conn = self.lock()?;
        let job = conn
            .query_row(
                "SELECT * FROM import_jobs WHERE job_id = ?1",
                params![job_id],
                Self::map_job_row,
            )
            .optional()?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::{ImportRow, RowError, RowOutcome};
    use crate::domain::types::RowErrorKind;
    use crate::repository::schema::init_schema;

    fn repo() -> ImportJobRepositoryImpl {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        ImportJobRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_job_lifecycle() {
        let repo = repo();
        let job = ImportJob::new("t1", Some("products.csv".to_string()), Some(1024));
        repo.create_job(&job).await.unwrap();

        repo.set_status(&job.job_id, JobStatus::Processing, "processing rows")
            .await
            .unwrap();
        let current = repo.get_job(&job.job_id).await.unwrap().unwrap();
        assert_eq!(current.status, JobStatus::Processing);
        assert!(current.started_at.is_some());

        repo.complete(&job.job_id, JobStatus::Completed, Utc::now(), "done")
            .await
            .unwrap();
        let finished = repo.get_job(&job.job_id).await.unwrap().unwrap();
        assert_eq!(finished.status, JobStatus::Completed);
        assert!(finished.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_job_not_found() {
        let repo = repo();
        let result = repo
            .set_status("missing", JobStatus::Processing, "x")
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_record_row_outcome() {
        let repo = repo();
        let job = ImportJob::new("t1", None, None);
        repo.create_job(&job).await.unwrap();

        let row = ImportRow {
            row_number: 3,
            data_row_number: 2,
            ..Default::default()
        };
        let outcome = RowOutcome::failure(
            &row,
            vec![RowError::general(&row, RowErrorKind::System, "boom")],
        );
        repo.record_row_outcome(&job.job_id, &outcome).await.unwrap();

        repo.update_progress(&job.job_id, 1, 0, 1).await.unwrap();
        let current = repo.get_job(&job.job_id).await.unwrap().unwrap();
        assert_eq!(current.processed_rows, 1);
        assert_eq!(current.error_rows, 1);
    }

    #[tokio::test]
    async fn test_cancel_flag() {
        let repo = repo();
        let job = ImportJob::new("t1", None, None);
        repo.create_job(&job).await.unwrap();

        assert!(!repo.is_cancel_requested(&job.job_id).await.unwrap());
        repo.request_cancel(&job.job_id).await.unwrap();
        assert!(repo.is_cancel_requested(&job.job_id).await.unwrap());
    }
}
