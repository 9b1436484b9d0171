//! Canonical rows: normalized records ready for storage

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized manual usage correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAdjustmentRow {
    pub account_id: String,
    pub dataset_id: String,
    pub date: NaiveDate,
    pub product: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A normalized raw usage event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUsageRow {
    pub account_id: String,
    pub dataset_id: String,
    pub date: NaiveDate,
    /// Time-of-day, present only when the source cell carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    pub product: String,
    pub tokens: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// A normalized quota-attainment transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaAttainmentRow {
    pub account_id: String,
    pub dataset_id: String,
    pub date: NaiveDate,
    pub transaction_id: String,
    pub product: String,
    pub amount: Decimal,
}

/// One normalized record, tagged by its destination table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalRow {
    ManualAdjustment(ManualAdjustmentRow),
    RawUsage(RawUsageRow),
    QuotaAttainment(QuotaAttainmentRow),
}

impl CanonicalRow {
    /// Destination table for this row.
    pub fn table(&self) -> &'static str {
        match self {
            CanonicalRow::ManualAdjustment(_) => "manual_adjustments",
            CanonicalRow::RawUsage(_) => "raw_usage_events",
            CanonicalRow::QuotaAttainment(_) => "quota_transactions",
        }
    }

    /// The canonical calendar date of this row.
    pub fn date(&self) -> NaiveDate {
        match self {
            CanonicalRow::ManualAdjustment(r) => r.date,
            CanonicalRow::RawUsage(r) => r.date,
            CanonicalRow::QuotaAttainment(r) => r.date,
        }
    }

    /// Serialize to a JSON record for the relational store.
    pub fn to_record(&self) -> Value {
        // Serialization of these field types cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_table_names() {
        let row = CanonicalRow::ManualAdjustment(ManualAdjustmentRow {
            account_id: "a".into(),
            dataset_id: "d".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            product: "pro".into(),
            amount: Decimal::from_str("12.50").unwrap(),
            note: None,
        });
        assert_eq!(row.table(), "manual_adjustments");
    }

    #[test]
    fn test_record_serialization_date_and_amount() {
        let row = CanonicalRow::QuotaAttainment(QuotaAttainmentRow {
            account_id: "acct-1".into(),
            dataset_id: "ds-1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            transaction_id: "txn-9".into(),
            product: "enterprise".into(),
            amount: Decimal::from_str("1099.99").unwrap(),
        });
        let v = row.to_record();
        assert_eq!(v["date"], "2024-01-15");
        assert_eq!(v["transactionId"], "txn-9");
        assert_eq!(v["amount"], "1099.99");
    }

    #[test]
    fn test_time_omitted_for_date_only_rows() {
        let row = CanonicalRow::RawUsage(RawUsageRow {
            account_id: "a".into(),
            dataset_id: "d".into(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            time: None,
            product: "base".into(),
            tokens: 1500,
            user_id: None,
            project_id: None,
        });
        let v = row.to_record();
        assert!(v.get("time").is_none());
        assert_eq!(v["tokens"], 1500);
    }
}
