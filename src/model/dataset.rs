//! Dataset records and their lifecycle state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Known dataset shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetType {
    /// Hand-entered usage corrections
    ManualAdjustments,
    /// Raw per-user/per-project usage events
    RawUsage,
    /// Quota-attainment transactions
    QuotaAttainment,
    /// Header signature did not match any known shape
    Unknown,
}

impl std::fmt::Display for DatasetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetType::ManualAdjustments => write!(f, "manual_adjustments"),
            DatasetType::RawUsage => write!(f, "raw_usage"),
            DatasetType::QuotaAttainment => write!(f, "quota_attainment"),
            DatasetType::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for DatasetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual_adjustments" => Ok(DatasetType::ManualAdjustments),
            "raw_usage" => Ok(DatasetType::RawUsage),
            "quota_attainment" => Ok(DatasetType::QuotaAttainment),
            "unknown" => Ok(DatasetType::Unknown),
            _ => Err(format!("Invalid dataset type: {}", s)),
        }
    }
}

/// Lifecycle status of a dataset
///
/// Transitions are monotonic and one-directional:
/// `queued -> processing -> {completed, failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    /// Uploaded and waiting for ingestion
    Queued,
    /// An ingestion run currently owns this dataset
    Processing,
    /// Ingestion finished (possibly with rejected rows)
    Completed,
    /// Ingestion failed; no further runs without operator action
    Failed,
}

impl DatasetStatus {
    /// Whether a status write from `self` to `to` is legal.
    ///
    /// Called before every status update; illegal transitions (e.g.
    /// completed -> queued) are rejected instead of overwritten.
    pub fn can_transition(self, to: DatasetStatus) -> bool {
        matches!(
            (self, to),
            (DatasetStatus::Queued, DatasetStatus::Processing)
                | (DatasetStatus::Processing, DatasetStatus::Completed)
                | (DatasetStatus::Processing, DatasetStatus::Failed)
        )
    }

    /// Whether the dataset has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, DatasetStatus::Completed | DatasetStatus::Failed)
    }
}

impl std::fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetStatus::Queued => write!(f, "queued"),
            DatasetStatus::Processing => write!(f, "processing"),
            DatasetStatus::Completed => write!(f, "completed"),
            DatasetStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for DatasetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(DatasetStatus::Queued),
            "processing" => Ok(DatasetStatus::Processing),
            "completed" => Ok(DatasetStatus::Completed),
            "failed" => Ok(DatasetStatus::Failed),
            _ => Err(format!("Invalid dataset status: {}", s)),
        }
    }
}

/// One uploaded file's processing record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Unique dataset identifier
    pub id: String,
    /// Owning account
    pub account_id: String,
    /// Dataset type fixed at upload-finalize time
    pub dataset_type: DatasetType,
    /// Original filename as uploaded
    pub original_filename: String,
    /// Location of the raw bytes in the object store
    pub storage_path: String,
    /// Header list captured at detection time; authoritative for this file
    pub detected_headers: Option<Vec<String>>,
    /// Lifecycle status
    pub status: DatasetStatus,
    /// When the upload was finalized
    pub uploaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Create a freshly queued dataset record.
    pub fn new(
        account_id: &str,
        dataset_type: DatasetType,
        original_filename: &str,
        storage_path: &str,
        detected_headers: Option<Vec<String>>,
    ) -> Self {
        Self {
            id: Self::generate_id(),
            account_id: account_id.to_string(),
            dataset_type,
            original_filename: original_filename.to_string(),
            storage_path: storage_path.to_string(),
            detected_headers,
            status: DatasetStatus::Queued,
            uploaded_at: Utc::now(),
        }
    }

    /// Generate a new dataset ID
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
