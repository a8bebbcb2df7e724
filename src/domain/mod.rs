// ==========================================
// Product Catalog Import - Domain layer
// ==========================================
// Responsibility: entities and value types
// Red line: no persistence, no I/O in this layer
// ==========================================

pub mod import;
pub mod product;
pub mod types;

// Re-export core types
pub use import::{
    HeaderMapping, ImportJob, ImportReport, ImportRow, ImportSummary, LogicalField, RowError,
    RowOutcome,
};
pub use product::{InventoryRecord, Product, ProductFamily};
pub use types::{InventoryStatus, JobStatus, ProductCategory, RowErrorKind};
