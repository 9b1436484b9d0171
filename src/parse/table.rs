//! Unified tabular reading for CSV and spreadsheet-binary uploads
//!
//! Both formats surface as a [`Table`] of [`Cell`]s: workbook date cells
//! come through as numeric serials, CSV cells as text. The per-type parsers
//! never see the source format.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use thiserror::Error;

/// Errors while reading the tabular body of an upload
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file has no header row
    #[error("file is empty or has no header row")]
    EmptyFile,

    /// CSV decoding error
    #[error("CSV read error: {0}")]
    Csv(String),

    /// Workbook decoding error
    #[error("workbook read error: {0}")]
    Workbook(String),
}

/// One spreadsheet cell, normalized across source formats
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Trimmed textual rendering; whole numbers drop the fraction.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(f) => {
                if *f == f.floor() && f.abs() < 1e15 {
                    format!("{}", *f as i64)
                } else {
                    f.to_string()
                }
            }
            Cell::Bool(b) => b.to_string(),
        }
    }

    /// Numeric value, parsing numeric-looking text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(f) => Some(*f),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Empty | Cell::Bool(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) | Cell::Bool(_) => false,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            // Date cells surface as their underlying serial so the date
            // normalizer owns the epoch correction.
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) => Cell::Empty,
        }
    }
}

/// A parsed tabular body: header row plus data rows
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// True when a data row contains no non-blank cell.
    pub fn row_is_blank(row: &[Cell]) -> bool {
        row.iter().all(Cell::is_blank)
    }
}

/// Build a normalized header-name -> column-index map.
///
/// Lookups are case-insensitive and tolerant of column reordering.
/// Duplicate headers are last-one-wins.
pub fn header_index(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        let key = normalize_header(header);
        if !key.is_empty() {
            map.insert(key, idx);
        }
    }
    map
}

/// Lowercase, trim, and collapse separators so `User ID`, `user_id`, and
/// `user-id` all index the same column.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Find the column index for the first alias present in the header map.
pub fn find_column(index: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| index.get(&normalize_header(alias)).copied())
}

/// True when the bytes look like a spreadsheet binary rather than CSV.
///
/// Sniffs the ZIP magic (xlsx) and the OLE2 magic (legacy xls), falling
/// back to the filename extension.
pub fn is_workbook(bytes: &[u8], filename: &str) -> bool {
    if bytes.starts_with(b"PK\x03\x04") {
        return true;
    }
    if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return true;
    }
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    matches!(ext.as_str(), "xlsx" | "xlsm" | "xlsb" | "xls" | "ods")
}

/// Read the full tabular body of an upload.
pub fn read_table(bytes: &[u8], filename: &str) -> Result<Table, ParseError> {
    if is_workbook(bytes, filename) {
        read_workbook(bytes)
    } else {
        read_csv(bytes)
    }
}

/// Read only the header row of an upload.
///
/// Used by type detection, which must not pay for a full body parse on
/// large CSV uploads.
pub fn read_headers(bytes: &[u8], filename: &str) -> Result<Vec<String>, ParseError> {
    if is_workbook(bytes, filename) {
        // calamine materializes the sheet either way; take row 0.
        return Ok(read_workbook(bytes)?.headers);
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| ParseError::Csv(e.to_string()))?;
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::EmptyFile);
    }
    Ok(headers.iter().map(|h| h.trim().to_string()).collect())
}

fn read_csv(bytes: &[u8]) -> Result<Table, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ParseError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(ParseError::EmptyFile);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ParseError::Csv(e.to_string()))?;
        let row: Vec<Cell> = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

fn read_workbook(bytes: &[u8]) -> Result<Table, ParseError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| ParseError::Workbook(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names.first().ok_or(ParseError::EmptyFile)?;
    let range = workbook
        .worksheet_range(first)
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter.next().ok_or(ParseError::EmptyFile)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| Cell::from(cell).as_text())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(ParseError::EmptyFile);
    }

    let rows: Vec<Vec<Cell>> = rows_iter
        .map(|row| row.iter().map(Cell::from).collect())
        .collect();

    Ok(Table { headers, rows })
}
