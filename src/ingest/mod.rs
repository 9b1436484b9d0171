//! Ingestion orchestration
//!
//! Owns the full processing state machine for one dataset:
//! `queued -> processing -> {completed, failed}`. A run claims the dataset
//! with a compare-and-swap status update, fetches the stored bytes, parses
//! and validates rows, inserts them in chunks, and records the terminal
//! status. Faults never propagate: every attempt returns an
//! [`IngestionResult`] the calling endpoint can translate.

mod config;
mod error;

pub use config::IngestConfig;
pub use error::IngestError;

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::model::{CanonicalRow, Dataset, DatasetStatus, DatasetType, IngestionResult};
use crate::parse;
use crate::store::{ObjectStore, RelationalStore};

/// Table holding dataset processing records
pub const DATASETS_TABLE: &str = "datasets";

/// Drives ingestion runs against an object store and a relational store
pub struct Ingestor {
    objects: Arc<dyn ObjectStore>,
    db: Arc<dyn RelationalStore>,
    config: IngestConfig,
}

impl Ingestor {
    /// Create an ingestor with default configuration.
    pub fn new(objects: Arc<dyn ObjectStore>, db: Arc<dyn RelationalStore>) -> Self {
        Self::with_config(objects, db, IngestConfig::default())
    }

    /// Create an ingestor with explicit configuration.
    pub fn with_config(
        objects: Arc<dyn ObjectStore>,
        db: Arc<dyn RelationalStore>,
        config: IngestConfig,
    ) -> Self {
        Self {
            objects,
            db,
            config,
        }
    }

    /// Run one ingestion attempt for a queued dataset.
    ///
    /// Never returns an error: faults become a failed result with a
    /// human-readable message and whatever counts were reached. Rows
    /// committed before a mid-run failure stay committed; retries do not
    /// deduplicate them.
    pub async fn ingest_dataset(&self, dataset_id: &str, account_id: &str) -> IngestionResult {
        info!(dataset_id, account_id, "starting ingestion");

        let dataset = match self.load_dataset(dataset_id, account_id).await {
            Ok(dataset) => dataset,
            Err(e) => {
                error!(dataset_id, error = %e, "cannot load dataset record");
                return IngestionResult::failed(e.to_string());
            }
        };

        // Serialization point: losing the compare-and-swap means another
        // run owns this dataset (or it is already terminal).
        if let Err(e) = self.claim(&dataset).await {
            warn!(dataset_id, error = %e, "dataset claim rejected");
            return IngestionResult::failed(e.to_string());
        }

        let result = self.run(&dataset).await;

        let terminal = if result.success {
            DatasetStatus::Completed
        } else {
            DatasetStatus::Failed
        };
        if let Err(e) = self
            .set_status(&dataset, DatasetStatus::Processing, terminal)
            .await
        {
            error!(dataset_id, error = %e, "failed to record terminal status");
            return IngestionResult::failed(e.to_string()).with_counts(
                result.rows_processed,
                result.rows_inserted,
                result.rejections,
            );
        }

        info!(
            dataset_id,
            success = result.success,
            rows_processed = result.rows_processed,
            rows_inserted = result.rows_inserted,
            rows_rejected = result.rows_rejected,
            "ingestion finished"
        );
        result
    }

    async fn load_dataset(
        &self,
        dataset_id: &str,
        account_id: &str,
    ) -> Result<Dataset, IngestError> {
        let filter = json!({ "id": dataset_id, "accountId": account_id });
        let record = self
            .db
            .select_one(DATASETS_TABLE, &filter)
            .await
            .map_err(|e| IngestError::Database(e.to_string()))?
            .ok_or_else(|| IngestError::DatasetNotFound(dataset_id.to_string()))?;
        serde_json::from_value(record)
            .map_err(|e| IngestError::Database(format!("malformed dataset record: {}", e)))
    }

    /// Claim the dataset for this run: `queued -> processing` where the
    /// status is still `queued`, checked by affected-row count.
    async fn claim(&self, dataset: &Dataset) -> Result<(), IngestError> {
        if !dataset
            .status
            .can_transition(DatasetStatus::Processing)
        {
            return Err(IngestError::NotQueued {
                status: dataset.status,
            });
        }
        let filter = json!({
            "id": dataset.id,
            "accountId": dataset.account_id,
            "status": DatasetStatus::Queued,
        });
        let patch = json!({ "status": DatasetStatus::Processing });
        let affected = self
            .db
            .update(DATASETS_TABLE, &filter, &patch)
            .await
            .map_err(|e| IngestError::Database(e.to_string()))?;
        if affected != 1 {
            return Err(IngestError::NotQueued {
                status: dataset.status,
            });
        }
        Ok(())
    }

    /// Write a status transition, rejecting illegal ones before the write.
    async fn set_status(
        &self,
        dataset: &Dataset,
        from: DatasetStatus,
        to: DatasetStatus,
    ) -> Result<(), IngestError> {
        if !from.can_transition(to) {
            return Err(IngestError::IllegalTransition { from, to });
        }
        let filter = json!({
            "id": dataset.id,
            "accountId": dataset.account_id,
            "status": from,
        });
        let affected = self
            .db
            .update(DATASETS_TABLE, &filter, &json!({ "status": to }))
            .await
            .map_err(|e| IngestError::Database(e.to_string()))?;
        if affected != 1 {
            return Err(IngestError::Database(format!(
                "status update {} -> {} affected {} rows",
                from, to, affected
            )));
        }
        Ok(())
    }

    /// Fetch, parse, validate, and insert. Returns the attempt's result;
    /// the caller records the terminal status from its success flag.
    async fn run(&self, dataset: &Dataset) -> IngestionResult {
        let bytes = match self.objects.get(&dataset.storage_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let e = IngestError::Storage(e.to_string());
                error!(dataset_id = %dataset.id, path = %dataset.storage_path, error = %e, "cannot fetch stored file");
                return IngestionResult::failed(e.to_string());
            }
        };

        let table = match parse::read_table(&bytes, &dataset.original_filename) {
            Ok(table) => table,
            Err(e) => {
                let e = IngestError::Parse(e);
                error!(dataset_id = %dataset.id, error = %e, "unreadable upload body");
                return IngestionResult::failed(e.to_string());
            }
        };

        // The type was fixed at upload-finalize time; it is not
        // re-detected here.
        let effective_type = self.effective_type(dataset);
        let (rows, rejections) = parse::parse_rows(dataset, effective_type, &table);
        let rows_processed = rows.len() + rejections.len();

        if rows_processed == 0 {
            info!(dataset_id = %dataset.id, "upload contains no data rows");
            return IngestionResult::completed(0, 0, Vec::new());
        }
        if rows.is_empty() {
            warn!(
                dataset_id = %dataset.id,
                rows_rejected = rejections.len(),
                "every row failed validation"
            );
            return IngestionResult::failed("no valid rows in upload").with_counts(
                rows_processed,
                0,
                rejections,
            );
        }

        let destination = rows[0].table();
        let records: Vec<serde_json::Value> =
            rows.iter().map(CanonicalRow::to_record).collect();
        let mut rows_inserted = 0;

        // Chunks are inserted sequentially: a failure stops the run but
        // previously committed chunks stay committed. The size is clamped
        // here because the config field is freely writable.
        let chunk_size = self.config.chunk_size.max(1);
        for (chunk_no, chunk) in records.chunks(chunk_size).enumerate() {
            match self.db.insert_many(destination, chunk).await {
                Ok(count) => {
                    rows_inserted += count;
                    debug!(
                        dataset_id = %dataset.id,
                        chunk = chunk_no,
                        rows = count,
                        "chunk committed"
                    );
                }
                Err(e) => {
                    let e = IngestError::Database(e.to_string());
                    error!(
                        dataset_id = %dataset.id,
                        chunk = chunk_no,
                        rows_inserted,
                        error = %e,
                        "chunk insert failed"
                    );
                    return IngestionResult::failed(format!(
                        "insert failed at chunk {}: {}",
                        chunk_no, e
                    ))
                    .with_counts(rows_processed, rows_inserted, rejections);
                }
            }
        }

        IngestionResult::completed(rows_processed, rows_inserted, rejections)
    }

    fn effective_type(&self, dataset: &Dataset) -> DatasetType {
        if dataset.dataset_type == DatasetType::Unknown {
            warn!(
                dataset_id = %dataset.id,
                fallback = %self.config.fallback_type,
                "dataset type is unknown, using fallback"
            );
            self.config.fallback_type
        } else {
            dataset.dataset_type
        }
    }
}
