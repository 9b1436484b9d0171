//! Core data model: datasets, canonical rows, and ingestion results

mod dataset;
mod result;
mod row;

pub use dataset::{Dataset, DatasetStatus, DatasetType};
pub use result::{IngestionResult, RowError, RowRejection};
pub use row::{CanonicalRow, ManualAdjustmentRow, QuotaAttainmentRow, RawUsageRow};
