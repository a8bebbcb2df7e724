// ==========================================
// Product Catalog Import - Importer Implementation
// ==========================================
// Responsibility: end-to-end orchestration of one import job
// Flow: register job -> open source -> detect header -> chunked run ->
// final status + report
// ==========================================

use crate::config::ImportConfig;
use crate::domain::import::{HeaderMapping, ImportJob, ImportReport, ImportSummary};
use crate::domain::types::JobStatus;
use crate::importer::chunk_runner::{ChunkRunner, RunStats};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::family_resolver::FamilyResolver;
use crate::importer::header_detector::HeaderDetector;
use crate::importer::job_tracker::JobLifecycleTracker;
use crate::importer::product_creator::ProductCreator;
use crate::importer::product_importer_trait::ProductImporter;
use crate::importer::row_decoder::RowDecoder;
use crate::importer::row_validator::RowValidator;
use crate::importer::spreadsheet::{
    CellValue, CsvSource, ExcelSource, SpreadsheetSource, UniversalSource,
};
use crate::importer::synonyms::SynonymDictionary;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::import_job_repo::ImportJobRepository;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

// ==========================================
// ProductImporterImpl
// ==========================================
pub struct ProductImporterImpl<R, J>
where
    R: CatalogRepository,
    J: ImportJobRepository,
{
    repo: Arc<R>,
    ledger: Arc<J>,
    config: ImportConfig,
    dictionary: SynonymDictionary,
}

impl<R, J> ProductImporterImpl<R, J>
where
    R: CatalogRepository,
    J: ImportJobRepository,
{
    pub fn new(repo: Arc<R>, ledger: Arc<J>, config: ImportConfig) -> Self {
        Self {
            repo,
            ledger,
            config,
            dictionary: SynonymDictionary::default(),
        }
    }

    /// Replace the default header synonym dictionary
    pub fn with_dictionary(mut self, dictionary: SynonymDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    /// Full pipeline for an already chosen source
    async fn run_with_source(
        &self,
        mut source: Box<dyn SpreadsheetSource>,
        file_path: &str,
        tenant_id: &str,
    ) -> ImportResult<ImportReport> {
        let path = Path::new(file_path);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        let file_size = std::fs::metadata(path).ok().map(|m| m.len());

        // ===== Step 1: register the job (QUEUED) =====
        let job = ImportJob::new(tenant_id, file_name.clone(), file_size);
        let tracker = JobLifecycleTracker::register(self.ledger.as_ref(), &job).await?;
        let started_at = Utc::now();

        // ===== Step 2..n: the fallible pipeline =====
        // Every structural failure lands the job in FAILED before the
        // error propagates to the caller.
        let result = self
            .run_pipeline(source.as_mut(), path, tenant_id, &tracker)
            .await;
        source.close();

        let (mapping, stats) = match result {
            Ok(parts) => parts,
            Err(e) => {
                error!("job {} failed: {}", tracker.job_id(), e);
                // Recording the failure is best effort; the original
                // error is the one worth reporting
                let _ = tracker.finish(JobStatus::Failed, &e.to_string()).await;
                return Err(e);
            }
        };

        // ===== Final status and report =====
        let status = if stats.cancelled {
            JobStatus::Cancelled
        } else {
            JobStatus::Completed
        };
        tracker
            .snapshot(stats.total_rows, stats.success_rows, stats.failed_rows)
            .await?;
        tracker.finish(status, "import finished").await?;

        let finished_at = Utc::now();
        let elapsed_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        info!(
            "job {}: {} row(s) in {} ms, {} ok, {} failed",
            tracker.job_id(),
            stats.total_rows,
            elapsed_ms,
            stats.success_rows,
            stats.failed_rows
        );

        Ok(ImportReport {
            job_id: tracker.job_id().to_string(),
            status,
            file_name,
            file_size,
            header_row_index: mapping.header_row_index,
            column_map: mapping.column_map_by_name(),
            summary: ImportSummary {
                total_rows: stats.total_rows,
                success_rows: stats.success_rows,
                failed_rows: stats.failed_rows,
                started_at,
                finished_at,
                elapsed_ms,
            },
            errors: stats.errors,
        })
    }

    async fn run_pipeline(
        &self,
        source: &mut dyn SpreadsheetSource,
        path: &Path,
        tenant_id: &str,
        tracker: &JobLifecycleTracker<'_>,
    ) -> ImportResult<(HeaderMapping, RunStats)> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // ===== Open the source =====
        tracker.start("opening file").await?;
        source.open()?;

        // ===== Detect the header inside the scan window =====
        tracker.phase("detecting header").await?;
        let mut scan_window: Vec<Vec<CellValue>> = Vec::new();
        while scan_window.len() < self.config.header_scan_rows {
            match source.next_row() {
                Some(row) => scan_window.push(row),
                None => break,
            }
        }
        let detector = HeaderDetector::new(self.dictionary.clone(), &self.config);
        let mapping = detector.detect(&scan_window)?;
        debug!(
            "header found at row index {} (score {})",
            mapping.header_row_index, mapping.score
        );

        // ===== Chunked processing =====
        tracker.phase("processing rows").await?;
        let runner = ChunkRunner::new(
            RowDecoder,
            ProductCreator::new(RowValidator::new(), FamilyResolver::new()),
            self.config.chunk_size,
        );
        let stats = runner
            .run(
                source,
                scan_window,
                &mapping,
                tenant_id,
                self.repo.as_ref(),
                tracker,
            )
            .await?;

        Ok((mapping, stats))
    }
}

#[async_trait]
impl<R, J> ProductImporter for ProductImporterImpl<R, J>
where
    R: CatalogRepository,
    J: ImportJobRepository,
{
    async fn import_from_excel(
        &self,
        file_path: &str,
        tenant_id: &str,
    ) -> ImportResult<ImportReport> {
        info!("starting Excel import: {}", file_path);
        let source = Box::new(ExcelSource::new(file_path));
        self.run_with_source(source, file_path, tenant_id).await
    }

    async fn import_from_csv(
        &self,
        file_path: &str,
        tenant_id: &str,
    ) -> ImportResult<ImportReport> {
        info!("starting CSV import: {}", file_path);
        let source = Box::new(CsvSource::new(file_path));
        self.run_with_source(source, file_path, tenant_id).await
    }

    #[instrument(skip(self))]
    async fn import_file(
        &self,
        file_path: &str,
        tenant_id: &str,
    ) -> ImportResult<ImportReport> {
        let source = UniversalSource::for_path(file_path)?;
        self.run_with_source(source, file_path, tenant_id).await
    }

    async fn batch_import(
        &self,
        file_paths: &[String],
        tenant_id: &str,
    ) -> Vec<ImportResult<ImportReport>> {
        info!("batch import of {} file(s)", file_paths.len());
        let futures = file_paths
            .iter()
            .map(|path| self.import_file(path, tenant_id));
        join_all(futures).await
    }
}
