// ==========================================
// Product Catalog Import - Spreadsheet sources
// ==========================================
// Supports: Excel (.xlsx/.xls) / CSV (.csv)
// Contract: open() once, then next_row() until None, then close().
// Rows are ordered sequences of typed cells addressable by column index.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};

// ==========================================
// CellValue - one typed spreadsheet cell
// ==========================================
// Formula cells are materialized by the backend into their string or
// numeric result before they reach this type.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
    Blank,
    Error,
}

// ==========================================
// SpreadsheetSource trait
// ==========================================
// Implementors: ExcelSource, CsvSource
pub trait SpreadsheetSource: Send {
    /// Open the underlying file and position at the first row
    ///
    /// Fatal on missing file, wrong extension, unreadable content or an
    /// empty workbook.
    fn open(&mut self) -> ImportResult<()>;

    /// Pull the next row; None at end of sheet
    fn next_row(&mut self) -> Option<Vec<CellValue>>;

    /// Release the source
    fn close(&mut self);
}

// ==========================================
// ExcelSource (calamine)
// ==========================================
// The first worksheet is buffered at open; per-chunk buffering is the
// supported memory model.
pub struct ExcelSource {
    path: PathBuf,
    rows: VecDeque<Vec<CellValue>>,
}

impl ExcelSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            rows: VecDeque::new(),
        }
    }

    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => CellValue::Date(naive),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) => CellValue::Error,
            Data::Empty => CellValue::Blank,
        }
    }
}

impl SpreadsheetSource for ExcelSource {
    fn open(&mut self) -> ImportResult<()> {
        if !self.path.exists() {
            return Err(ImportError::FileNotFound(self.path.display().to_string()));
        }

        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError(
                "workbook has no worksheets".to_string(),
            ));
        }

        // Single-sheet model: only the first worksheet is imported
        let sheet_name = sheet_names[0].clone();
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        self.rows = range
            .rows()
            .map(|row| row.iter().map(Self::convert_cell).collect())
            .collect();

        Ok(())
    }

    fn next_row(&mut self) -> Option<Vec<CellValue>> {
        self.rows.pop_front()
    }

    fn close(&mut self) {
        self.rows.clear();
    }
}

// ==========================================
// CsvSource (csv crate)
// ==========================================
// Every cell arrives as text; typing happens downstream in the decoder.
pub struct CsvSource {
    path: PathBuf,
    rows: VecDeque<Vec<CellValue>>,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            rows: VecDeque::new(),
        }
    }
}

impl SpreadsheetSource for CsvSource {
    fn open(&mut self) -> ImportResult<()> {
        if !self.path.exists() {
            return Err(ImportError::FileNotFound(self.path.display().to_string()));
        }

        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // header position is detected, not assumed
            .flexible(true)     // tolerate ragged rows
            .from_reader(file);

        let mut rows = VecDeque::new();
        for result in reader.records() {
            let record = result?;
            let cells: Vec<CellValue> = record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        CellValue::Blank
                    } else {
                        CellValue::Text(value.to_string())
                    }
                })
                .collect();
            rows.push_back(cells);
        }

        self.rows = rows;
        Ok(())
    }

    fn next_row(&mut self) -> Option<Vec<CellValue>> {
        self.rows.pop_front()
    }

    fn close(&mut self) {
        self.rows.clear();
    }
}

// ==========================================
// UniversalSource - extension-based selection
// ==========================================
pub struct UniversalSource;

impl UniversalSource {
    /// Pick the right source for a path by its extension
    pub fn for_path<P: AsRef<Path>>(path: P) -> ImportResult<Box<dyn SpreadsheetSource>> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Box::new(CsvSource::new(path))),
            "xlsx" | "xls" => Ok(Box::new(ExcelSource::new(path))),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
