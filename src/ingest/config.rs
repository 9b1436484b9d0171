//! Ingestion configuration

use serde::{Deserialize, Serialize};

use crate::model::DatasetType;

/// Configuration for ingestion runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Rows per insert request; bounds request size against the store
    pub chunk_size: usize,
    /// Effective type for datasets recorded as `unknown`
    pub fallback_type: DatasetType,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            fallback_type: DatasetType::ManualAdjustments,
        }
    }
}

impl IngestConfig {
    /// Set the insert chunk size (minimum 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the fallback dataset type.
    pub fn with_fallback_type(mut self, fallback_type: DatasetType) -> Self {
        self.fallback_type = fallback_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.fallback_type, DatasetType::ManualAdjustments);
    }

    #[test]
    fn test_chunk_size_floor() {
        let config = IngestConfig::default().with_chunk_size(0);
        assert_eq!(config.chunk_size, 1);
    }
}
