//! Usage Ingestion Core - dataset ingestion for the usage analytics dashboard
//!
//! Provides the ingestion pipeline behind spreadsheet/CSV uploads:
//! - Header-based dataset type detection
//! - Row normalization into canonical records (with legacy spreadsheet
//!   serial-date correction)
//! - Batched, partial-failure-aware insertion with a dataset lifecycle
//!   state machine
//!
//! The surrounding dashboard (auth, CRUD endpoints, charts) talks to this
//! crate through [`Ingestor::ingest_dataset`] and the store traits in
//! [`store`].

pub mod dates;
pub mod detect;
pub mod ingest;
pub mod model;
pub mod parse;
pub mod store;

// Re-export commonly used types
pub use detect::{Detection, detect_dataset_type, detect_or_fallback};
pub use ingest::{DATASETS_TABLE, IngestConfig, IngestError, Ingestor};
pub use model::{
    CanonicalRow, Dataset, DatasetStatus, DatasetType, IngestionResult, ManualAdjustmentRow,
    QuotaAttainmentRow, RawUsageRow, RowError, RowRejection,
};
pub use parse::{Cell, ParseError, Table, parse_rows, read_table};
pub use store::{
    FileSystemObjectStore, MemoryObjectStore, MemoryStore, ObjectStore, RelationalStore,
    StoreError,
};
