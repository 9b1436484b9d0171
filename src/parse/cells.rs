//! Typed cell extraction shared by the per-type parsers
//!
//! Each reader converts one cell into a canonical value or a [`RowError`].
//! Malformed cells are rejections, never coerced defaults.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use crate::dates;
use crate::model::RowError;
use crate::parse::table::Cell;

/// Provenance attached to every canonical row
pub(crate) struct RowContext<'a> {
    pub account_id: &'a str,
    pub dataset_id: &'a str,
}

/// Product label aliases -> canonical product keys
static PRODUCT_KEYS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("base", "base"),
        ("base plan", "base"),
        ("standard", "base"),
        ("pro", "pro"),
        ("professional", "pro"),
        ("enterprise", "enterprise"),
        ("ent", "enterprise"),
        ("business", "enterprise"),
    ])
});

/// Map a product/category label to its canonical key.
pub fn normalize_product(label: &str) -> Option<&'static str> {
    PRODUCT_KEYS.get(label.trim().to_lowercase().as_str()).copied()
}

fn cell_at<'a>(row: &'a [Cell], col: Option<usize>) -> &'a Cell {
    col.and_then(|c| row.get(c)).unwrap_or(&Cell::Empty)
}

/// Read a required date cell, resolving numeric serials and textual dates.
///
/// Returns the calendar date plus a time-of-day only when the source cell
/// carried one.
pub(crate) fn date_cell(
    row: &[Cell],
    col: Option<usize>,
    field: &str,
) -> Result<(NaiveDate, Option<NaiveTime>), RowError> {
    let cell = cell_at(row, col);
    if cell.is_blank() {
        return Err(RowError::MissingField(field.to_string()));
    }
    match cell {
        Cell::Number(serial) => {
            let date = dates::serial_to_date(*serial)
                .map_err(|_| RowError::BadDate(cell.as_text()))?;
            if serial.fract() == 0.0 {
                Ok((date, None))
            } else {
                let dt = dates::serial_to_datetime(*serial)
                    .ok_or_else(|| RowError::BadDate(cell.as_text()))?;
                Ok((dt.date(), Some(dt.time())))
            }
        }
        Cell::Text(text) => {
            let text = text.trim();
            if let Some(dt) = dates::parse_datetime_text(text) {
                return Ok((dt.date(), Some(dt.time())));
            }
            if let Some(date) = dates::parse_date_text(text) {
                return Ok((date, None));
            }
            // CSV exports of serial dates arrive as digit strings.
            if let Ok(serial) = text.parse::<f64>() {
                return date_cell(&[Cell::Number(serial)], Some(0), field);
            }
            Err(RowError::BadDate(text.to_string()))
        }
        Cell::Bool(_) | Cell::Empty => Err(RowError::BadDate(cell.as_text())),
    }
}

/// Read a required monetary cell as a decimal, preserving its scale.
///
/// Tolerates currency symbols and thousands separators in textual cells.
pub(crate) fn decimal_cell(
    row: &[Cell],
    col: Option<usize>,
    field: &str,
) -> Result<Decimal, RowError> {
    let cell = cell_at(row, col);
    if cell.is_blank() {
        return Err(RowError::MissingField(field.to_string()));
    }
    match cell {
        Cell::Number(f) => {
            Decimal::from_f64_retain(*f).ok_or_else(|| RowError::BadNumber(cell.as_text()))
        }
        Cell::Text(text) => {
            let cleaned = text.trim().trim_start_matches('$').replace(',', "");
            Decimal::from_str(&cleaned).map_err(|_| RowError::BadNumber(text.trim().to_string()))
        }
        Cell::Bool(_) | Cell::Empty => Err(RowError::BadNumber(cell.as_text())),
    }
}

/// Read a required whole-number token count.
pub(crate) fn tokens_cell(
    row: &[Cell],
    col: Option<usize>,
    field: &str,
) -> Result<i64, RowError> {
    let cell = cell_at(row, col);
    if cell.is_blank() {
        return Err(RowError::MissingField(field.to_string()));
    }
    let value = cell
        .as_number()
        .or_else(|| cell.as_text().replace(',', "").parse::<f64>().ok())
        .ok_or_else(|| RowError::BadNumber(cell.as_text()))?;
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 {
        return Err(RowError::BadNumber(cell.as_text()));
    }
    Ok(value as i64)
}

/// Read a required product cell and map it to a canonical key.
pub(crate) fn product_cell(
    row: &[Cell],
    col: Option<usize>,
    field: &str,
) -> Result<String, RowError> {
    let cell = cell_at(row, col);
    if cell.is_blank() {
        return Err(RowError::MissingField(field.to_string()));
    }
    let label = cell.as_text();
    normalize_product(&label)
        .map(str::to_string)
        .ok_or(RowError::UnknownProduct(label))
}

/// Read a required free-text cell.
pub(crate) fn text_cell(
    row: &[Cell],
    col: Option<usize>,
    field: &str,
) -> Result<String, RowError> {
    let cell = cell_at(row, col);
    if cell.is_blank() {
        return Err(RowError::MissingField(field.to_string()));
    }
    Ok(cell.as_text())
}

/// Read an optional free-text cell.
pub(crate) fn optional_text(row: &[Cell], col: Option<usize>) -> Option<String> {
    let cell = cell_at(row, col);
    if cell.is_blank() {
        None
    } else {
        Some(cell.as_text())
    }
}
