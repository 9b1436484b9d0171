//! Store abstractions
//!
//! The core treats its surroundings as two narrow surfaces: an object
//! store holding uploaded file bytes and a row-oriented relational store.
//! The hosted implementations live with the application; this crate ships
//! a filesystem object store and in-memory backends for tests.

use async_trait::async_trait;
use serde_json::Value;

pub mod filesystem;
pub mod memory;

pub use filesystem::FileSystemObjectStore;
pub use memory::{MemoryObjectStore, MemoryStore};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Object store holding uploaded file bytes
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the raw bytes stored at `path`.
    async fn get(&self, path: &str) -> Result<Vec<u8>, StoreError>;
}

/// Row-oriented relational store
///
/// Rows cross this boundary as JSON objects; filters and patches are JSON
/// objects whose fields must all match / are all applied. The core owns no
/// schema migration.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Fetch the first row matching `filter`, if any.
    async fn select_one(&self, table: &str, filter: &Value) -> Result<Option<Value>, StoreError>;

    /// Insert rows, returning how many were committed.
    async fn insert_many(&self, table: &str, rows: &[Value]) -> Result<usize, StoreError>;

    /// Patch all rows matching `filter`, returning the affected count.
    ///
    /// The affected count is the compare-and-swap primitive for status
    /// claims: an update filtered on the expected current value that
    /// affects zero rows means the claim lost.
    async fn update(&self, table: &str, filter: &Value, patch: &Value)
    -> Result<usize, StoreError>;
}
