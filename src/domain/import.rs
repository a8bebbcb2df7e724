// ==========================================
// Product Catalog Import - Import domain model
// ==========================================
// Responsibility: intermediate and reporting structures of the pipeline
// Lifecycle: ImportRow lives only inside the import flow; the report and
// job records are the externally visible artifacts
// ==========================================

use crate::domain::types::{JobStatus, RowErrorKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// LogicalField - the import vocabulary
// ==========================================
// Columns of the source sheet are mapped onto these fields by the header
// detector. code / name / quantity are mandatory; a header candidate that
// misses any of them is disqualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalField {
    Code,
    Name,
    Quantity,
    Family,
    Category,
    Price,
    Description,
    Manufacturer,
    Upc,
    ManufacturerCode,
    MinStockLevel,
    ApplyTax,
    Visible,
}

impl LogicalField {
    /// Every logical field, in matching order (deterministic detection)
    pub const ALL: [LogicalField; 13] = [
        LogicalField::Code,
        LogicalField::Name,
        LogicalField::Quantity,
        LogicalField::Family,
        LogicalField::Category,
        LogicalField::Price,
        LogicalField::Description,
        LogicalField::Manufacturer,
        LogicalField::Upc,
        LogicalField::ManufacturerCode,
        LogicalField::MinStockLevel,
        LogicalField::ApplyTax,
        LogicalField::Visible,
    ];

    pub const MANDATORY: [LogicalField; 3] = [
        LogicalField::Code,
        LogicalField::Name,
        LogicalField::Quantity,
    ];

    pub fn is_mandatory(&self) -> bool {
        LogicalField::MANDATORY.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalField::Code => "code",
            LogicalField::Name => "name",
            LogicalField::Quantity => "quantity",
            LogicalField::Family => "family",
            LogicalField::Category => "category",
            LogicalField::Price => "price",
            LogicalField::Description => "description",
            LogicalField::Manufacturer => "manufacturer",
            LogicalField::Upc => "upc",
            LogicalField::ManufacturerCode => "manufacturer_code",
            LogicalField::MinStockLevel => "min_stock_level",
            LogicalField::ApplyTax => "apply_tax",
            LogicalField::Visible => "visible",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// HeaderMapping - result of header detection
// ==========================================
// Computed once per import, immutable afterwards. Guaranteed by the
// detector: all three mandatory fields are present in `columns` and the
// score met the configured floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderMapping {
    /// 0-based index of the detected header row
    pub header_row_index: usize,

    /// Logical field -> 0-based column index
    pub columns: HashMap<LogicalField, usize>,

    /// Logical field -> raw header text that matched
    pub raw_headers: HashMap<LogicalField, String>,

    /// Match score of the winning candidate
    pub score: u32,
}

impl HeaderMapping {
    pub fn column(&self, field: LogicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Column map keyed by field name, for the import report
    pub fn column_map_by_name(&self) -> HashMap<String, usize> {
        self.columns
            .iter()
            .map(|(field, col)| (field.as_str().to_string(), *col))
            .collect()
    }
}

// ==========================================
// ImportRow - one decoded data row
// ==========================================
// Created fresh per row by the decoder, consumed immediately by the
// validator and creator, never persisted. No field is defaulted here;
// defaulting happens at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRow {
    /// 1-based physical row number (header included)
    pub row_number: usize,
    /// 1-based data row ordinal (header and skipped empty rows excluded)
    pub data_row_number: usize,

    pub code: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
    pub family_name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub upc: Option<String>,
    pub manufacturer_code: Option<String>,
    pub min_stock_level: Option<Decimal>,
    pub apply_tax: Option<bool>,
    pub visible: Option<bool>,
}

// ==========================================
// RowError - one per-row failure
// ==========================================
// Always attached to exactly one RowOutcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: usize,
    pub data_row_number: usize,
    /// Field the error concerns; "general" for non-field errors
    pub field: String,
    /// Offending raw value, when one exists
    pub raw_value: Option<String>,
    pub kind: RowErrorKind,
    pub message: String,
    /// Suggested fix shown to the user
    pub suggestion: Option<String>,
}

impl RowError {
    pub fn new(
        row: &ImportRow,
        field: &str,
        raw_value: Option<String>,
        kind: RowErrorKind,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            row_number: row.row_number,
            data_row_number: row.data_row_number,
            field: field.to_string(),
            raw_value,
            kind,
            message: message.into(),
            suggestion,
        }
    }

    /// Non-field error (system failures, family resolution failures)
    pub fn general(
        row: &ImportRow,
        kind: RowErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row_number: row.row_number,
            data_row_number: row.data_row_number,
            field: "general".to_string(),
            raw_value: None,
            kind,
            message: message.into(),
            suggestion: None,
        }
    }
}

// ==========================================
// RowOutcome - per-row disposition
// ==========================================
// Invariant: success == errors.is_empty() == product_id.is_some()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row_number: usize,
    pub data_row_number: usize,
    pub success: bool,
    pub errors: Vec<RowError>,
    pub product_id: Option<String>,
    pub product_code: Option<String>,
}

impl RowOutcome {
    pub fn success(row: &ImportRow, product_id: String, product_code: String) -> Self {
        Self {
            row_number: row.row_number,
            data_row_number: row.data_row_number,
            success: true,
            errors: Vec::new(),
            product_id: Some(product_id),
            product_code: Some(product_code),
        }
    }

    pub fn failure(row: &ImportRow, errors: Vec<RowError>) -> Self {
        Self {
            row_number: row.row_number,
            data_row_number: row.data_row_number,
            success: false,
            errors,
            product_id: None,
            product_code: None,
        }
    }
}

// ==========================================
// ImportJob - job ledger record
// ==========================================
// The pipeline mutates this through the job ledger interface only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub job_id: String,
    pub tenant_id: String,
    pub status: JobStatus,
    pub phase: Option<String>,

    // ===== File metadata =====
    pub file_name: Option<String>,
    pub file_size: Option<u64>,

    // ===== Aggregate counts =====
    pub total_rows: usize,
    pub processed_rows: usize,
    pub success_rows: usize,
    pub error_rows: usize,

    // ===== Timing =====
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ImportJob {
    pub fn new(tenant_id: &str, file_name: Option<String>, file_size: Option<u64>) -> Self {
        Self {
            job_id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            status: JobStatus::Queued,
            phase: None,
            file_name,
            file_size,
            total_rows: 0,
            processed_rows: 0,
            success_rows: 0,
            error_rows: 0,
            started_at: None,
            finished_at: None,
            created_at: Utc::now(),
        }
    }
}

// ==========================================
// ImportSummary / ImportReport - the produced artifact
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub success_rows: usize,
    pub failed_rows: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub job_id: String,
    pub status: JobStatus,

    // ===== File metadata =====
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub header_row_index: usize,
    pub column_map: HashMap<String, usize>,

    // ===== Disposition =====
    pub summary: ImportSummary,
    pub errors: Vec<RowError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandatory_fields() {
        assert!(LogicalField::Code.is_mandatory());
        assert!(LogicalField::Name.is_mandatory());
        assert!(LogicalField::Quantity.is_mandatory());
        assert!(!LogicalField::Price.is_mandatory());
        assert!(!LogicalField::Family.is_mandatory());
    }

    #[test]
    fn test_outcome_invariant() {
        let row = ImportRow {
            row_number: 2,
            data_row_number: 1,
            ..Default::default()
        };

        let ok = RowOutcome::success(&row, "id-1".to_string(), "A1".to_string());
        assert!(ok.success && ok.errors.is_empty() && ok.product_id.is_some());

        let err = RowOutcome::failure(
            &row,
            vec![RowError::general(
                &row,
                crate::domain::types::RowErrorKind::System,
                "boom",
            )],
        );
        assert!(!err.success && !err.errors.is_empty() && err.product_id.is_none());
    }
}
