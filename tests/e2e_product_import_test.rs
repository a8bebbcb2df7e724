// ==========================================
// End-to-end job flow tests
// ==========================================
// Scope: job ledger transitions, row outcome records, structural
// failures, cancellation
// ==========================================


use async_trait::async_trait;
use catalog_import::config::ImportConfig;
use catalog_import::domain::import::{ImportJob, RowOutcome};
use catalog_import::domain::types::JobStatus;
use catalog_import::importer::{ImportError, ProductImporter, ProductImporterImpl};
use catalog_import::logging;
use catalog_import::repository::{
    CatalogRepositoryImpl, ImportJobRepository, ImportJobRepositoryImpl, RepositoryResult,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use test_helpers::{count_rows, create_test_db, create_test_importer, open_shared_connection, write_temp_csv};

#[tokio::test]
async fn test_ledger_records_full_lifecycle() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db();
    let conn = open_shared_connection(&db_path);
    let importer = create_test_importer(conn.clone(), ImportConfig::default());

    let (_csv_file, csv_path) = write_temp_csv(
        "Code,Name,Quantity\n\
         E-001,Lamp,2\n\
         ,No Code,1\n\
         E-002,Chair,5\n",
    );

    let report = importer
        .import_from_csv(&csv_path, "tenant-a")
        .await
        .expect("import should succeed");

    let ledger = ImportJobRepositoryImpl::from_connection(conn.clone());
    let job = ledger
        .get_job(&report.job_id)
        .await
        .unwrap()
        .expect("job should be in the ledger");

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.tenant_id, "tenant-a");
    assert_eq!(job.processed_rows, 3);
    assert_eq!(job.success_rows, 2);
    assert_eq!(job.error_rows, 1);
    assert!(job.started_at.is_some());
    assert!(job.finished_at.is_some());
    assert!(job.file_name.is_some());
    assert!(job.file_size.unwrap_or(0) > 0);

    // One outcome record per processed data row
    assert_eq!(count_rows(&conn, "import_row_outcomes"), 3);
}

#[tokio::test]
async fn test_all_rows_failing_still_completes() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db();
    let conn = open_shared_connection(&db_path);
    let importer = create_test_importer(conn.clone(), ImportConfig::default());

    let (_csv_file, csv_path) = write_temp_csv(
        "Code,Name,Quantity\n\
         ,Nameless Code,1\n\
         X-1,,1\n\
         X-2,No Quantity,\n",
    );

    let report = importer
        .import_from_csv(&csv_path, "tenant-a")
        .await
        .expect("100% row failure is still a completed run");

    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.summary.total_rows, 3);
    assert_eq!(report.summary.failed_rows, 3);
    assert_eq!(count_rows(&conn, "products"), 0);
}

#[tokio::test]
async fn test_empty_file_fails_the_job() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db();
    let conn = open_shared_connection(&db_path);
    let importer = create_test_importer(conn.clone(), ImportConfig::default());

    let (_csv_file, csv_path) = write_temp_csv("");
    let result = importer.import_from_csv(&csv_path, "tenant-a").await;
    assert!(matches!(result, Err(ImportError::EmptySheet)));

    // The structural failure is on the ledger
    let status: String = {
        let conn = conn.lock().unwrap();
        conn.query_row("SELECT status FROM import_jobs", [], |row| row.get(0))
            .unwrap()
    };
    assert_eq!(status, "FAILED");
}

#[tokio::test]
async fn test_missing_header_fails_the_job() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db();
    let conn = open_shared_connection(&db_path);
    let importer = create_test_importer(conn, ImportConfig::default());

    // Data-looking lines, nothing resembling the expected headers
    let (_csv_file, csv_path) = write_temp_csv(
        "alpha,beta,gamma\n\
         1,2,3\n\
         4,5,6\n",
    );

    let result = importer.import_from_csv(&csv_path, "tenant-a").await;
    assert!(matches!(result, Err(ImportError::HeaderNotFound(_))));
}

#[tokio::test]
async fn test_chunked_run_spans_transactions() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db();
    let conn = open_shared_connection(&db_path);

    // Tiny chunks force several commit boundaries
    let config = ImportConfig {
        chunk_size: 2,
        ..ImportConfig::default()
    };
    let importer = create_test_importer(conn.clone(), config);

    let mut csv = String::from("Code,Name,Quantity\n");
    for i in 0..7 {
        csv.push_str(&format!("C-{:03},Item {},1\n", i, i));
    }
    let (_csv_file, csv_path) = write_temp_csv(&csv);

    let report = importer
        .import_from_csv(&csv_path, "tenant-a")
        .await
        .expect("import should succeed");

    assert_eq!(report.summary.success_rows, 7);
    assert_eq!(count_rows(&conn, "products"), 7);
}

// ==========================================
// Cancellation: a ledger that always reports the flag set makes the very
// first chunk boundary the stopping point, deterministically
// ==========================================
struct AlwaysCancelledLedger {
    inner: ImportJobRepositoryImpl,
}

#[async_trait]
impl ImportJobRepository for AlwaysCancelledLedger {
    async fn create_job(&self, job: &ImportJob) -> RepositoryResult<()> {
        self.inner.create_job(job).await
    }
    async fn set_status(
        &self,
        job_id: &str,
        status: JobStatus,
        phase: &str,
    ) -> RepositoryResult<()> {
        self.inner.set_status(job_id, status, phase).await
    }
    async fn complete(
        &self,
        job_id: &str,
        status: JobStatus,
        finished_at: DateTime<Utc>,
        phase: &str,
    ) -> RepositoryResult<()> {
        self.inner.complete(job_id, status, finished_at, phase).await
    }
    async fn record_row_outcome(
        &self,
        job_id: &str,
        outcome: &RowOutcome,
    ) -> RepositoryResult<()> {
        self.inner.record_row_outcome(job_id, outcome).await
    }
    async fn update_progress(
        &self,
        job_id: &str,
        processed_rows: usize,
        success_rows: usize,
        error_rows: usize,
    ) -> RepositoryResult<()> {
        self.inner
            .update_progress(job_id, processed_rows, success_rows, error_rows)
            .await
    }
    async fn request_cancel(&self, job_id: &str) -> RepositoryResult<()> {
        self.inner.request_cancel(job_id).await
    }
    async fn is_cancel_requested(&self, _job_id: &str) -> RepositoryResult<bool> {
        Ok(true)
    }
    async fn get_job(&self, job_id: &str) -> RepositoryResult<Option<ImportJob>> {
        self.inner.get_job(job_id).await
    }
}

#[tokio::test]
async fn test_cancellation_yields_cancelled_status() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db();
    let conn = open_shared_connection(&db_path);

    let repo = Arc::new(CatalogRepositoryImpl::from_connection(conn.clone()));
    let ledger = Arc::new(AlwaysCancelledLedger {
        inner: ImportJobRepositoryImpl::from_connection(conn.clone()),
    });
    let importer = ProductImporterImpl::new(repo, ledger, ImportConfig::default());

    let (_csv_file, csv_path) = write_temp_csv(
        "Code,Name,Quantity\n\
         K-1,One,1\n\
         K-2,Two,2\n",
    );

    let report = importer
        .import_from_csv(&csv_path, "tenant-a")
        .await
        .expect("cancellation is a clean finish, not an error");

    assert_eq!(report.status, JobStatus::Cancelled);
    assert_eq!(report.summary.total_rows, 0);
    assert_eq!(count_rows(&conn, "products"), 0);

    let status: String = {
        let conn = conn.lock().unwrap();
        conn.query_row("SELECT status FROM import_jobs", [], |row| row.get(0))
            .unwrap()
    };
    assert_eq!(status, "CANCELLED");
}
