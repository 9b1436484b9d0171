//! Ingestion outcome contract

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single row was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum RowError {
    /// A required column is absent or the cell is blank
    #[error("missing required field: {0}")]
    MissingField(String),
    /// The date cell resolved to no valid calendar date
    #[error("unparseable date: {0}")]
    BadDate(String),
    /// The numeric cell is malformed (never coerced to zero)
    #[error("unparseable number: {0}")]
    BadNumber(String),
    /// The product/category label maps to no known product key
    #[error("unknown product: {0}")]
    UnknownProduct(String),
}

/// A per-row rejection, reported but never fatal on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRejection {
    /// Zero-based data row index (header row excluded)
    pub row: usize,
    /// What went wrong
    pub error: RowError,
}

impl RowRejection {
    pub fn new(row: usize, error: RowError) -> Self {
        Self { row, error }
    }
}

/// The outcome of one ingestion attempt
///
/// Created fresh per attempt; immutable once returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
    /// Whether the attempt ran without a fatal error
    pub success: bool,
    /// Non-blank data rows seen
    pub rows_processed: usize,
    /// Rows committed to the destination table
    pub rows_inserted: usize,
    /// Rows excluded by validation
    pub rows_rejected: usize,
    /// Human-readable message when the attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-row rejection detail, in row order
    pub rejections: Vec<RowRejection>,
}

impl IngestionResult {
    /// A failed attempt that touched no rows.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            rows_processed: 0,
            rows_inserted: 0,
            rows_rejected: 0,
            error: Some(message.into()),
            rejections: Vec::new(),
        }
    }

    /// A completed attempt with exact counts.
    pub fn completed(
        rows_processed: usize,
        rows_inserted: usize,
        rejections: Vec<RowRejection>,
    ) -> Self {
        Self {
            success: true,
            rows_processed,
            rows_inserted,
            rows_rejected: rejections.len(),
            error: None,
            rejections,
        }
    }

    /// Attach counts to a failed attempt (partial success stays visible).
    pub fn with_counts(
        mut self,
        rows_processed: usize,
        rows_inserted: usize,
        rejections: Vec<RowRejection>,
    ) -> Self {
        self.rows_processed = rows_processed;
        self.rows_inserted = rows_inserted;
        self.rows_rejected = rejections.len();
        self.rejections = rejections;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result() {
        let result = IngestionResult::failed("object store unreachable");
        assert!(!result.success);
        assert_eq!(result.rows_inserted, 0);
        assert_eq!(
            result.error.as_deref(),
            Some("object store unreachable")
        );
    }

    #[test]
    fn test_completed_counts() {
        let rejections = vec![
            RowRejection::new(3, RowError::BadDate("13/45/99".into())),
            RowRejection::new(7, RowError::MissingField("amount".into())),
        ];
        let result = IngestionResult::completed(10, 8, rejections);
        assert!(result.success);
        assert_eq!(result.rows_processed, 10);
        assert_eq!(result.rows_inserted, 8);
        assert_eq!(result.rows_rejected, 2);
    }

    #[test]
    fn test_partial_failure_keeps_counts() {
        let result = IngestionResult::failed("insert failed at chunk 2")
            .with_counts(10, 5, Vec::new());
        assert!(!result.success);
        assert_eq!(result.rows_inserted, 5);
        assert_eq!(result.rows_processed, 10);
    }

    #[test]
    fn test_rejection_serialization() {
        let r = RowRejection::new(2, RowError::UnknownProduct("gold".into()));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["row"], 2);
        assert_eq!(v["error"]["kind"], "unknownProduct");
        assert_eq!(v["error"]["value"], "gold");
    }
}
