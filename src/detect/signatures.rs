//! Column aliases and header signatures for the known dataset shapes
//!
//! The alias lists are the single source of truth for both detection and
//! row parsing: a header variant accepted at detection time is the same
//! variant the parsers map from.

use crate::model::DatasetType;

/// Accepted header variants for the canonical date column
pub const DATE: &[&str] = &["date", "usage date", "transaction date", "day"];

/// Accepted header variants for the product key column
pub const PRODUCT: &[&str] = &["product", "product key", "plan", "sku"];

/// Accepted header variants for monetary amount columns
pub const AMOUNT: &[&str] = &["amount", "credited amount", "credits", "value"];

/// Accepted header variants for token-count columns
pub const TOKENS: &[&str] = &["tokens", "token count", "total tokens"];

/// Accepted header variants for the user dimension
pub const USER: &[&str] = &["user", "user id", "user email"];

/// Accepted header variants for the project dimension
pub const PROJECT: &[&str] = &["project", "project id", "workspace"];

/// Accepted header variants for transaction identifiers
pub const TRANSACTION: &[&str] = &["transaction id", "txn id", "transaction"];

/// Accepted header variants for free-text notes
pub const NOTE: &[&str] = &["note", "reason", "description", "memo"];

/// A header signature identifying one dataset shape
pub struct Signature {
    pub dataset_type: DatasetType,
    /// Every entry is an alias list; one alias per list must be present.
    pub required: &'static [&'static [&'static str]],
}

/// Known signatures, most specific first.
///
/// Quota files are distinguished by their transaction column and raw usage
/// by its token column; manual adjustments are the least specific shape and
/// double as the fallback.
pub const SIGNATURES: &[Signature] = &[
    Signature {
        dataset_type: DatasetType::QuotaAttainment,
        required: &[DATE, TRANSACTION, PRODUCT, AMOUNT],
    },
    Signature {
        dataset_type: DatasetType::RawUsage,
        required: &[DATE, PRODUCT, TOKENS],
    },
    Signature {
        dataset_type: DatasetType::ManualAdjustments,
        required: &[DATE, PRODUCT, AMOUNT],
    },
];
