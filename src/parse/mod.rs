//! Row parsing and normalization
//!
//! Converts the tabular body of an upload into canonical rows for one of
//! the known dataset shapes. Parsing is a pure fold: each data row either
//! becomes a [`CanonicalRow`] or a [`RowRejection`], and one bad row never
//! aborts the batch.

pub mod table;

mod cells;
mod manual;
mod quota;
mod usage;

pub use cells::normalize_product;
pub use table::{Cell, ParseError, Table, read_headers, read_table};

use crate::model::{CanonicalRow, Dataset, DatasetType, RowRejection};

/// Parse all data rows of `table` for the given effective dataset type.
///
/// The dataset's detected header list, when present, is authoritative for
/// column mapping even if it differs from the canonical template. Blank
/// rows are skipped and keep their physical position in rejection indexes.
pub fn parse_rows(
    dataset: &Dataset,
    effective_type: DatasetType,
    table: &Table,
) -> (Vec<CanonicalRow>, Vec<RowRejection>) {
    let headers = dataset
        .detected_headers
        .clone()
        .unwrap_or_else(|| table.headers.clone());
    let index = table::header_index(&headers);
    let ctx = cells::RowContext {
        account_id: &dataset.account_id,
        dataset_id: &dataset.id,
    };

    match effective_type {
        DatasetType::QuotaAttainment => quota::parse(&ctx, &index, table),
        DatasetType::RawUsage => usage::parse(&ctx, &index, table),
        // Unknown is resolved to a concrete fallback by the orchestrator
        // before parsing; treat a stray Unknown as the default shape.
        DatasetType::ManualAdjustments | DatasetType::Unknown => {
            manual::parse(&ctx, &index, table)
        }
    }
}
