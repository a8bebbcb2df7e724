// ==========================================
// Product Catalog Import - Header row detection
// ==========================================
// Responsibility: locate the header row among the leading rows of a sheet
// by scoring each candidate against the synonym dictionary
// Side effects: none (pure over the scanned rows, deterministic)
// ==========================================

use crate::config::{ImportConfig, MANDATORY_FIELD_WEIGHT, OPTIONAL_FIELD_WEIGHT};
use crate::domain::import::{HeaderMapping, LogicalField};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::spreadsheet::CellValue;
use crate::importer::synonyms::{normalize_header, SynonymDictionary};
use std::collections::HashMap;
use tracing::debug;

pub struct HeaderDetector {
    dictionary: SynonymDictionary,
    scan_rows: usize,
    min_score: u32,
    early_exit_score: u32,
}

impl HeaderDetector {
    pub fn new(dictionary: SynonymDictionary, config: &ImportConfig) -> Self {
        Self {
            dictionary,
            scan_rows: config.header_scan_rows,
            min_score: config.mandatory_min_score(),
            early_exit_score: config.early_exit_score(),
        }
    }

    /// Detect the header row within the leading rows of the sheet
    ///
    /// Scans at most `scan_rows` candidates, keeps the best-scoring one and
    /// stops early once a score reaches the early-exit threshold (the best
    /// seen so far is retained, so stopping never changes the outcome).
    pub fn detect(&self, rows: &[Vec<CellValue>]) -> ImportResult<HeaderMapping> {
        if rows.is_empty() {
            return Err(ImportError::EmptySheet);
        }

        let mut best: Option<HeaderMapping> = None;

        for (index, row) in rows.iter().take(self.scan_rows).enumerate() {
            let Some(candidate) = self.score_row(index, row) else {
                continue;
            };

            debug!(
                row_index = index,
                score = candidate.score,
                fields = candidate.columns.len(),
                "header candidate"
            );

            let improves = best
                .as_ref()
                .map(|b| candidate.score > b.score)
                .unwrap_or(true);
            if improves {
                best = Some(candidate);
            }

            if best.as_ref().map(|b| b.score).unwrap_or(0) >= self.early_exit_score {
                break;
            }
        }

        match best {
            Some(mapping) if mapping.score >= self.min_score => Ok(mapping),
            _ => Err(ImportError::HeaderNotFound(
                "no suitable header row found".to_string(),
            )),
        }
    }

    /// Score one candidate row
    ///
    /// Each matched logical field contributes its weight once; a field maps
    /// to its first matching column. A candidate missing any mandatory
    /// field is disqualified outright (None), no matter what else matched.
    fn score_row(&self, index: usize, row: &[CellValue]) -> Option<HeaderMapping> {
        let mut columns: HashMap<LogicalField, usize> = HashMap::new();
        let mut raw_headers: HashMap<LogicalField, String> = HashMap::new();

        for (col, cell) in row.iter().enumerate() {
            let Some(raw) = cell_text(cell) else {
                continue;
            };
            let normalized = normalize_header(&raw);
            if normalized.is_empty() {
                continue;
            }

            let Some(field) = self.match_field(&normalized) else {
                continue;
            };

            // First matching column wins for a field
            if !columns.contains_key(&field) {
                columns.insert(field, col);
                raw_headers.insert(field, raw);
            }
        }

        // Disqualify unless all mandatory fields are present
        if !LogicalField::MANDATORY
            .iter()
            .all(|f| columns.contains_key(f))
        {
            return None;
        }

        let score = columns
            .keys()
            .map(|field| {
                if field.is_mandatory() {
                    MANDATORY_FIELD_WEIGHT
                } else {
                    OPTIONAL_FIELD_WEIGHT
                }
            })
            .sum();

        Some(HeaderMapping {
            header_row_index: index,
            columns,
            raw_headers,
            score,
        })
    }

    /// Match one normalized cell against the dictionary
    ///
    /// Exact set membership across all fields first; only when no field
    /// matches exactly, fall back to substring containment.
    fn match_field(&self, normalized: &str) -> Option<LogicalField> {
        for field in LogicalField::ALL {
            if self.dictionary.matches_exact(field, normalized) {
                return Some(field);
            }
        }
        for field in LogicalField::ALL {
            if self.dictionary.matches_fuzzy(field, normalized) {
                return Some(field);
            }
        }
        None
    }
}

/// Raw text of a header cell, by its native type
fn cell_text(cell: &CellValue) -> Option<String> {
    let text = match cell {
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Date(d) => d.to_string(),
        CellValue::Blank | CellValue::Error => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
