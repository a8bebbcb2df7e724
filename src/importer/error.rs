// ==========================================
// Product Catalog Import - Importer error types
// ==========================================
// Tool: thiserror derive macro
// Scope: structural (fatal) failures only; per-row failures travel as
// RowError values inside RowOutcome, never as this type
// ==========================================

use thiserror::Error;

/// Structural importer errors
///
/// Anything of this type aborts the whole job: no rows survive a
/// structural failure, and the job ledger records status FAILED.
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File level =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("Excel parse failed: {0}")]
    ExcelParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    // ===== Structural detection =====
    #[error("sheet empty")]
    EmptySheet,

    #[error("no suitable header row found: {0}")]
    HeaderNotFound(String),

    // ===== Chunk / ledger level =====
    #[error("chunk commit failed: {0}")]
    ChunkCommitError(String),

    #[error("job ledger failure: {0}")]
    LedgerError(String),

    #[error("database failure: {0}")]
    DatabaseError(String),

    // ===== Generic =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<crate::repository::RepositoryError> for ImportError {
    fn from(err: crate::repository::RepositoryError) -> Self {
        ImportError::DatabaseError(err.to_string())
    }
}

/// Result alias for the importer layer
pub type ImportResult<T> = Result<T, ImportError>;
