// ==========================================
// Product Catalog Import - Import configuration
// ==========================================
// Responsibility: tunable knobs of the import pipeline
// Note: plain immutable value, injected at construction (no global state)
// ==========================================

use serde::{Deserialize, Serialize};

/// Weight of a mandatory logical field (code / name / quantity) in the
/// header score
pub const MANDATORY_FIELD_WEIGHT: u32 = 2;

/// Weight of an optional logical field in the header score
pub const OPTIONAL_FIELD_WEIGHT: u32 = 1;

/// Import pipeline configuration
///
/// Defaults match the production tuning: scan the first 10 rows for a
/// header, commit every 100 processed rows as one chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Maximum number of leading rows scanned for a header candidate
    pub header_scan_rows: usize,

    /// Number of processed data rows per transactional chunk
    pub chunk_size: usize,

    /// Minimum count of mandatory logical fields a header row must carry
    pub min_mandatory_fields: usize,
}

impl ImportConfig {
    /// Minimum score a header candidate must reach to be accepted
    ///
    /// The three mandatory fields each weigh MANDATORY_FIELD_WEIGHT, so the
    /// numeric floor is higher than the field-count floor.
    pub fn mandatory_min_score(&self) -> u32 {
        self.min_mandatory_fields as u32 * MANDATORY_FIELD_WEIGHT
    }

    /// Score at which the detector stops scanning further candidate rows
    ///
    /// The best candidate seen so far is retained, so stopping early never
    /// degrades the result.
    pub fn early_exit_score(&self) -> u32 {
        2 * self.mandatory_min_score()
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: 10,
            chunk_size: 100,
            min_mandatory_fields: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = ImportConfig::default();
        assert_eq!(config.header_scan_rows, 10);
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.mandatory_min_score(), 6);
        assert_eq!(config.early_exit_score(), 12);
    }
}
