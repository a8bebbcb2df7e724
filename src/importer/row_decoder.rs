// ==========================================
// Product Catalog Import - Row decoding
// ==========================================
// Responsibility: raw cells + header mapping -> typed ImportRow
// Guarantee: total. Malformed cells degrade to absence and a warning;
// missing-mandatory reporting belongs to the validator, not here.
// ==========================================

use crate::domain::import::{HeaderMapping, ImportRow, LogicalField};
use crate::importer::spreadsheet::CellValue;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

/// Multilingual truthy cell values (compared lowercase)
const TRUE_WORDS: [&str; 9] = ["true", "1", "yes", "oui", "si", "sí", "sim", "x", "✓"];

/// Multilingual falsy cell values (compared lowercase)
const FALSE_WORDS: [&str; 6] = ["false", "0", "no", "non", "nao", "não"];

pub struct RowDecoder;

impl RowDecoder {
    /// Decode one data row into an ImportRow
    ///
    /// Only fields present in the mapping are extracted; everything else
    /// stays absent.
    pub fn decode(
        &self,
        mapping: &HeaderMapping,
        cells: &[CellValue],
        row_number: usize,
        data_row_number: usize,
    ) -> ImportRow {
        ImportRow {
            row_number,
            data_row_number,
            code: self.string_field(mapping, cells, LogicalField::Code),
            name: self.string_field(mapping, cells, LogicalField::Name),
            quantity: self.decimal_field(mapping, cells, LogicalField::Quantity, row_number),
            family_name: self.string_field(mapping, cells, LogicalField::Family),
            category: self.string_field(mapping, cells, LogicalField::Category),
            price: self.decimal_field(mapping, cells, LogicalField::Price, row_number),
            description: self.string_field(mapping, cells, LogicalField::Description),
            manufacturer: self.string_field(mapping, cells, LogicalField::Manufacturer),
            upc: self.string_field(mapping, cells, LogicalField::Upc),
            manufacturer_code: self.string_field(mapping, cells, LogicalField::ManufacturerCode),
            min_stock_level: self.decimal_field(
                mapping,
                cells,
                LogicalField::MinStockLevel,
                row_number,
            ),
            apply_tax: self.bool_field(mapping, cells, LogicalField::ApplyTax),
            visible: self.bool_field(mapping, cells, LogicalField::Visible),
        }
    }

    /// A row is empty when every cell in its span is absent or blank.
    /// Empty rows are skipped by the caller without consuming a data-row
    /// number.
    pub fn is_empty_row(&self, cells: &[CellValue]) -> bool {
        cells.iter().all(|cell| stringify_cell(cell).is_none())
    }

    fn raw_value(
        &self,
        mapping: &HeaderMapping,
        cells: &[CellValue],
        field: LogicalField,
    ) -> Option<String> {
        let col = mapping.column(field)?;
        stringify_cell(cells.get(col)?)
    }

    fn string_field(
        &self,
        mapping: &HeaderMapping,
        cells: &[CellValue],
        field: LogicalField,
    ) -> Option<String> {
        self.raw_value(mapping, cells, field)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn decimal_field(
        &self,
        mapping: &HeaderMapping,
        cells: &[CellValue],
        field: LogicalField,
        row_number: usize,
    ) -> Option<Decimal> {
        let raw = self.raw_value(mapping, cells, field)?;
        match parse_decimal(&raw) {
            Some(value) => Some(value),
            None => {
                warn!(
                    row = row_number,
                    field = %field,
                    value = %raw,
                    "cell is not a number, treating as absent"
                );
                None
            }
        }
    }

    fn bool_field(
        &self,
        mapping: &HeaderMapping,
        cells: &[CellValue],
        field: LogicalField,
    ) -> Option<bool> {
        let raw = self.raw_value(mapping, cells, field)?;
        parse_bool(&raw)
    }
}

/// Stringify a cell by its native type
///
/// Text as-is, numbers in integer form when whole-valued, booleans as
/// "true"/"false", dates as their string representation. Blank and error
/// cells yield absence, as does text that trims to nothing.
fn stringify_cell(cell: &CellValue) -> Option<String> {
    let text = match cell {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            s.clone()
        }
        CellValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        CellValue::Bool(b) => b.to_string(),
        CellValue::Date(d) => d.to_string(),
        CellValue::Blank | CellValue::Error => return None,
    };
    Some(text)
}

/// Parse a decimal in a locale-tolerant way
///
/// Spaces (including NBSP) are thousands separators, a comma is a decimal
/// separator; anything that is not a digit, dot or minus is dropped.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .replace([' ', '\u{a0}'], "")
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Parse a boolean against the multilingual word sets
///
/// Unrecognized text is neither true nor false: the field is absent, not
/// in error.
fn parse_bool(raw: &str) -> Option<bool> {
    let lowered = raw.trim().to_lowercase();
    if TRUE_WORDS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}
