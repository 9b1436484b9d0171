//! Error types for ingestion orchestration

use thiserror::Error;

use crate::model::DatasetStatus;
use crate::parse::ParseError;

/// Errors that are fatal for one ingestion attempt
///
/// Every variant is caught inside the orchestrator and converted into a
/// failed [`crate::model::IngestionResult`]; none propagate to the caller.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The dataset record does not exist for this account
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// The dataset could not be claimed (already claimed or terminal)
    #[error("dataset is not queued (status: {status})")]
    NotQueued { status: DatasetStatus },

    /// A status write would violate the lifecycle state machine
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: DatasetStatus,
        to: DatasetStatus,
    },

    /// Object store failure while fetching the uploaded bytes
    #[error("storage error: {0}")]
    Storage(String),

    /// Relational store failure
    #[error("database error: {0}")]
    Database(String),

    /// The uploaded body could not be decoded at all
    #[error(transparent)]
    Parse(#[from] ParseError),
}
