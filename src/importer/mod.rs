// ==========================================
// Product Catalog Import - Importer layer
// ==========================================
// Responsibility: the full file-to-catalog pipeline
// Pipeline: source -> header detection -> row decoding -> validation ->
// creation, driven in transactional chunks with a job ledger alongside
// ==========================================

pub mod chunk_runner;
pub mod error;
pub mod family_resolver;
pub mod header_detector;
pub mod job_tracker;
pub mod product_creator;
pub mod product_importer_impl;
pub mod product_importer_trait;
pub mod row_decoder;
pub mod row_validator;
pub mod spreadsheet;
pub mod synonyms;

// Re-export core types
pub use chunk_runner::{ChunkRunner, RunStats};
pub use error::{ImportError, ImportResult};
pub use family_resolver::FamilyResolver;
pub use header_detector::HeaderDetector;
pub use job_tracker::JobLifecycleTracker;
pub use product_creator::ProductCreator;
pub use product_importer_impl::ProductImporterImpl;
pub use product_importer_trait::ProductImporter;
pub use row_decoder::RowDecoder;
pub use row_validator::RowValidator;
pub use spreadsheet::{CellValue, CsvSource, ExcelSource, SpreadsheetSource, UniversalSource};
pub use synonyms::SynonymDictionary;
