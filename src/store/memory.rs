//! In-memory store backends
//!
//! Used by the integration tests and by callers embedding the core without
//! a hosted store. `MemoryStore` supports injecting insert failures to
//! exercise partial-failure reporting.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ObjectStore, RelationalStore, StoreError};

/// Object store keeping file bytes in a map
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes at a path.
    pub fn put(&self, path: &str, bytes: Vec<u8>) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(path.to_string(), bytes);
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let objects = self
            .objects
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        objects
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}

#[derive(Default)]
struct MemoryStoreInner {
    tables: HashMap<String, Vec<Value>>,
    /// Remaining successful `insert_many` calls before injected failures
    inserts_before_failure: Option<usize>,
}

/// Relational store keeping tables as JSON row vectors
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

fn matches_filter(row: &Value, filter: &Value) -> bool {
    match filter.as_object() {
        Some(fields) => fields.iter().all(|(k, v)| row.get(k) == Some(v)),
        None => false,
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `insert_many` fail after `calls` successful calls.
    pub fn fail_inserts_after(&self, calls: usize) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.inserts_before_failure = Some(calls);
        }
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.tables.get(table).cloned())
            .unwrap_or_default()
    }

    /// Insert a single row directly (test setup).
    pub fn seed(&self, table: &str, row: Value) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.tables.entry(table.to_string()).or_default().push(row);
        }
    }
}

#[async_trait]
impl RelationalStore for MemoryStore {
    async fn select_one(&self, table: &str, filter: &Value) -> Result<Option<Value>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(inner
            .tables
            .get(table)
            .and_then(|rows| rows.iter().find(|row| matches_filter(row, filter)).cloned()))
    }

    async fn insert_many(&self, table: &str, rows: &[Value]) -> Result<usize, StoreError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if let Some(remaining) = inner.inserts_before_failure {
            if remaining == 0 {
                return Err(StoreError::Backend("injected insert failure".to_string()));
            }
            inner.inserts_before_failure = Some(remaining - 1);
        }
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .extend_from_slice(rows);
        Ok(rows.len())
    }

    async fn update(
        &self,
        table: &str,
        filter: &Value,
        patch: &Value,
    ) -> Result<usize, StoreError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let Some(rows) = inner.tables.get_mut(table) else {
            return Ok(0);
        };
        let Some(fields) = patch.as_object() else {
            return Err(StoreError::Backend("patch must be an object".to_string()));
        };
        let mut affected = 0;
        for row in rows.iter_mut() {
            if matches_filter(row, filter) {
                if let Some(target) = row.as_object_mut() {
                    for (k, v) in fields {
                        target.insert(k.clone(), v.clone());
                    }
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }
}
