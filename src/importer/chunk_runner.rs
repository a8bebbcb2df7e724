// ==========================================
// Product Catalog Import - Chunk Runner
// ==========================================
// Responsibility: drive the decoded row stream through the creator in
// transactional chunks, recording one outcome per data row
// Fault model: row failures are recorded and skipped without limit; a
// failing chunk commit or ledger write aborts the whole run
// ==========================================

use crate::domain::import::{HeaderMapping, RowError};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::job_tracker::JobLifecycleTracker;
use crate::importer::product_creator::ProductCreator;
use crate::importer::row_decoder::RowDecoder;
use crate::importer::spreadsheet::{CellValue, SpreadsheetSource};
use crate::repository::catalog_repo::CatalogRepository;
use tracing::{debug, info, warn};

// ==========================================
// Runner state machine
// ==========================================
// Idle -> Opening -> Reading -> Processing -> Reading ... -> Draining
//   -> Closed, with any structural failure jumping to Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunnerState {
    Idle,
    Opening,
    Reading,
    Processing,
    Draining,
    Closed,
    Failed,
}

fn transition(state: &mut RunnerState, next: RunnerState) {
    debug!("runner state {:?} -> {:?}", state, next);
    *state = next;
}

/// Aggregated result of one run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub total_rows: usize,
    pub success_rows: usize,
    pub failed_rows: usize,
    /// Every row error of the run, in row order
    pub errors: Vec<RowError>,
    /// True when the run stopped at a chunk boundary because the
    /// cancellation flag was set
    pub cancelled: bool,
}

// ==========================================
// ChunkRunner
// ==========================================
pub struct ChunkRunner {
    decoder: RowDecoder,
    creator: ProductCreator,
    chunk_size: usize,
}

impl ChunkRunner {
    pub fn new(decoder: RowDecoder, creator: ProductCreator, chunk_size: usize) -> Self {
        // A zero chunk size would never commit
        let chunk_size = chunk_size.max(1);
        Self {
            decoder,
            creator,
            chunk_size,
        }
    }

    /// Process every data row below the detected header
    ///
    /// `buffered` holds the rows already pulled from the source during
    /// header detection; the runner replays the ones below the header row
    /// before draining the source itself.
    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        &self,
        source: &mut dyn SpreadsheetSource,
        buffered: Vec<Vec<CellValue>>,
        mapping: &HeaderMapping,
        tenant_id: &str,
        repo: &dyn CatalogRepository,
        tracker: &JobLifecycleTracker<'_>,
    ) -> ImportResult<RunStats> {
        let mut state = RunnerState::Idle;
        let mut stats = RunStats {
            total_rows: 0,
            success_rows: 0,
            failed_rows: 0,
            errors: Vec::new(),
            cancelled: false,
        };

        // Physical row numbers are 1-based; data rows start right below
        // the header row.
        let mut row_number = mapping.header_row_index + 1;
        let mut data_row_number = 0usize;
        let mut rows_in_chunk = 0usize;
        let mut chunk_open = false;

        let mut replay = buffered
            .into_iter()
            .skip(mapping.header_row_index + 1)
            .collect::<Vec<_>>()
            .into_iter();

        loop {
            transition(&mut state, RunnerState::Reading);
            let cells = match replay.next() {
                Some(cells) => cells,
                None => match source.next_row() {
                    Some(cells) => cells,
                    None => break,
                },
            };
            row_number += 1;

            // Empty rows are skipped without consuming a data-row ordinal
            if self.decoder.is_empty_row(&cells) {
                debug!("row {} is empty, skipped", row_number);
                continue;
            }
            data_row_number += 1;

            // ===== Chunk boundary: cancellation, then transaction open =====
            if !chunk_open {
                if tracker.cancel_requested().await? {
                    info!(
                        "job {} cancellation honored after {} row(s)",
                        tracker.job_id(),
                        stats.total_rows
                    );
                    stats.cancelled = true;
                    break;
                }
                transition(&mut state, RunnerState::Opening);
                if let Err(e) = repo.begin_chunk().await {
                    transition(&mut state, RunnerState::Failed);
                    return Err(ImportError::ChunkCommitError(format!(
                        "failed to open chunk transaction: {}",
                        e
                    )));
                }
                chunk_open = true;
                rows_in_chunk = 0;
            }

            // ===== Process one row =====
            transition(&mut state, RunnerState::Processing);
            let row = self
                .decoder
                .decode(mapping, &cells, row_number, data_row_number);
            let outcome = self.creator.process_row(&row, tenant_id, repo).await;

            stats.total_rows += 1;
            if outcome.success {
                stats.success_rows += 1;
            } else {
                stats.failed_rows += 1;
                stats.errors.extend(outcome.errors.iter().cloned());
            }

            if let Err(e) = tracker.record_outcome(&outcome).await {
                self.abort_chunk(repo, chunk_open).await;
                transition(&mut state, RunnerState::Failed);
                return Err(e);
            }
            rows_in_chunk += 1;

            // ===== Chunk full: commit and snapshot =====
            if rows_in_chunk >= self.chunk_size {
                if let Err(e) = self.commit_chunk(repo).await {
                    transition(&mut state, RunnerState::Failed);
                    return Err(e);
                }
                chunk_open = false;
                tracker
                    .snapshot(stats.total_rows, stats.success_rows, stats.failed_rows)
                    .await?;
                debug!(
                    "chunk committed at {} row(s) processed",
                    stats.total_rows
                );
            }
        }

        // ===== Drain: commit the trailing partial chunk =====
        if chunk_open {
            transition(&mut state, RunnerState::Draining);
            if let Err(e) = self.commit_chunk(repo).await {
                transition(&mut state, RunnerState::Failed);
                return Err(e);
            }
            tracker
                .snapshot(stats.total_rows, stats.success_rows, stats.failed_rows)
                .await?;
        }

        transition(&mut state, RunnerState::Closed);
        info!(
            "run closed: {} row(s), {} ok, {} failed{}",
            stats.total_rows,
            stats.success_rows,
            stats.failed_rows,
            if stats.cancelled { " (cancelled)" } else { "" }
        );
        Ok(stats)
    }

    async fn commit_chunk(&self, repo: &dyn CatalogRepository) -> ImportResult<()> {
        if let Err(e) = repo.commit_chunk().await {
            warn!("chunk commit failed, rolling back: {}", e);
            if let Err(rollback_err) = repo.rollback_chunk().await {
                warn!("rollback after failed commit also failed: {}", rollback_err);
            }
            return Err(ImportError::ChunkCommitError(e.to_string()));
        }
        Ok(())
    }

    async fn abort_chunk(&self, repo: &dyn CatalogRepository, chunk_open: bool) {
        if chunk_open {
            if let Err(e) = repo.rollback_chunk().await {
                warn!("chunk rollback failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::domain::import::ImportJob;
    use crate::domain::types::JobStatus;
    use crate::importer::header_detector::HeaderDetector;
    use crate::importer::synonyms::SynonymDictionary;
    use crate::repository::catalog_repo_impl::CatalogRepositoryImpl;
    use crate::repository::import_job_repo::ImportJobRepository;
    use crate::repository::import_job_repo_impl::ImportJobRepositoryImpl;
    use crate::repository::schema::init_schema;
    use std::sync::{Arc, Mutex};

    struct VecSource {
        rows: Vec<Vec<CellValue>>,
        cursor: usize,
    }

    impl SpreadsheetSource for VecSource {
        fn open(&mut self) -> ImportResult<()> {
            Ok(())
        }
        fn next_row(&mut self) -> Option<Vec<CellValue>> {
            let row = self.rows.get(self.cursor).cloned();
            self.cursor += 1;
            row
        }
        fn close(&mut self) {}
    }

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells
            .iter()
            .map(|c| {
                if c.is_empty() {
                    CellValue::Blank
                } else {
                    CellValue::Text(c.to_string())
                }
            })
            .collect()
    }

    fn setup() -> (CatalogRepositoryImpl, ImportJobRepositoryImpl) {
        let conn = crate::db::open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (
            CatalogRepositoryImpl::from_connection(conn.clone()),
            ImportJobRepositoryImpl::from_connection(conn),
        )
    }

    fn runner(chunk_size: usize) -> ChunkRunner {
        ChunkRunner::new(RowDecoder, ProductCreator::default(), chunk_size)
    }

    fn detect(rows: &[Vec<CellValue>]) -> HeaderMapping {
        let config = ImportConfig::default();
        HeaderDetector::new(SynonymDictionary::default(), &config)
            .detect(rows)
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_mixes_success_and_failure() {
        let (repo, ledger) = setup();
        let rows = vec![
            text_row(&["Code", "Name", "Quantity"]),
            text_row(&["A1", "Alpha", "3"]),
            text_row(&["", "Beta", "2"]),        // missing code
            text_row(&["C3", "Gamma", "-1"]),    // negative quantity
            text_row(&["D4", "Delta", "0"]),
        ];
        let mapping = detect(&rows);

        let job = ImportJob::new("t1", None, None);
        let tracker = JobLifecycleTracker::register(&ledger, &job).await.unwrap();

        let mut source = VecSource {
            rows: rows.clone(),
            cursor: rows.len(),
        };
        let stats = runner(2)
            .run(&mut source, rows, &mapping, "t1", &repo, &tracker)
            .await
            .unwrap();

        assert_eq!(stats.total_rows, 4);
        assert_eq!(stats.success_rows, 2);
        assert_eq!(stats.failed_rows, 2);
        assert!(!stats.cancelled);
    }

    #[tokio::test]
    async fn test_empty_rows_do_not_consume_data_ordinals() {
        let (repo, ledger) = setup();
        let rows = vec![
            text_row(&["Code", "Name", "Quantity"]),
            text_row(&["A1", "Alpha", "3"]),
            text_row(&["", "", ""]),
            text_row(&["B2", "Beta", "1"]),
        ];
        let mapping = detect(&rows);

        let job = ImportJob::new("t1", None, None);
        let tracker = JobLifecycleTracker::register(&ledger, &job).await.unwrap();

        let mut source = VecSource {
            rows: rows.clone(),
            cursor: rows.len(),
        };
        let stats = runner(100)
            .run(&mut source, rows, &mapping, "t1", &repo, &tracker)
            .await
            .unwrap();

        // The blank line is invisible to the run
        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.success_rows, 2);
    }

    #[tokio::test]
    async fn test_duplicate_within_one_chunk_is_caught() {
        let (repo, ledger) = setup();
        let rows = vec![
            text_row(&["Code", "Name", "Quantity"]),
            text_row(&["A1", "Alpha", "3"]),
            text_row(&["A1", "Alpha again", "5"]),
        ];
        let mapping = detect(&rows);

        let job = ImportJob::new("t1", None, None);
        let tracker = JobLifecycleTracker::register(&ledger, &job).await.unwrap();

        let mut source = VecSource {
            rows: rows.clone(),
            cursor: rows.len(),
        };
        // Both rows land in the same (uncommitted) chunk; the second must
        // still see the first
        let stats = runner(100)
            .run(&mut source, rows, &mapping, "t1", &repo, &tracker)
            .await
            .unwrap();

        assert_eq!(stats.success_rows, 1);
        assert_eq!(stats.failed_rows, 1);
        assert_eq!(
            stats.errors[0].kind,
            crate::domain::types::RowErrorKind::Duplicate
        );
    }

    #[tokio::test]
    async fn test_cancellation_stops_at_chunk_boundary() {
        let (repo, ledger) = setup();
        let rows = vec![
            text_row(&["Code", "Name", "Quantity"]),
            text_row(&["A1", "Alpha", "1"]),
            text_row(&["B2", "Beta", "1"]),
            text_row(&["C3", "Gamma", "1"]),
            text_row(&["D4", "Delta", "1"]),
        ];
        let mapping = detect(&rows);

        let job = ImportJob::new("t1", None, None);
        let tracker = JobLifecycleTracker::register(&ledger, &job).await.unwrap();

        // Flag set before the run starts: nothing gets processed
        ledger.request_cancel(&job.job_id).await.unwrap();
        let mut source = VecSource {
            rows: rows.clone(),
            cursor: rows.len(),
        };
        let stats = runner(2)
            .run(&mut source, rows, &mapping, "t1", &repo, &tracker)
            .await
            .unwrap();

        assert!(stats.cancelled);
        assert_eq!(stats.total_rows, 0);
        assert_eq!(
            ledger
                .get_job(&job.job_id)
                .await
                .unwrap()
                .unwrap()
                .status,
            JobStatus::Queued
        );
    }
}
