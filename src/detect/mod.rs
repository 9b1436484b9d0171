//! Header-based dataset type detection
//!
//! Classifies an uploaded file into one of the known dataset shapes by
//! inspecting its header row only. Detection never fails an upload: an
//! unreadable or unrecognized file falls back to a default type at the
//! caller's explicit request via [`detect_or_fallback`].

pub mod signatures;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::DatasetType;
use crate::parse::table::{self, ParseError};

/// Detection outcome
///
/// A tagged variant rather than a nullable sentinel: the fallback decision
/// lives with the caller, not in a null-check downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Headers matched a known signature
    Recognized {
        dataset_type: DatasetType,
        headers: Vec<String>,
    },
    /// Headers were readable but matched no known signature
    Unrecognized { headers: Vec<String> },
}

impl Detection {
    /// The detected type, if any.
    pub fn dataset_type(&self) -> Option<DatasetType> {
        match self {
            Detection::Recognized { dataset_type, .. } => Some(*dataset_type),
            Detection::Unrecognized { .. } => None,
        }
    }

    /// The header row as read from the file.
    pub fn headers(&self) -> &[String] {
        match self {
            Detection::Recognized { headers, .. } | Detection::Unrecognized { headers } => headers,
        }
    }
}

/// Errors while reading the header row
#[derive(Debug, Error)]
pub enum DetectError {
    #[error(transparent)]
    Read(#[from] ParseError),
}

/// Classify a file's bytes and filename by its header row.
///
/// Matching is case-insensitive and tolerant of column reordering. Only
/// the header row is decoded; the body is untouched.
pub fn detect_dataset_type(bytes: &[u8], filename: &str) -> Result<Detection, DetectError> {
    let headers = table::read_headers(bytes, filename)?;
    let index = table::header_index(&headers);

    for signature in signatures::SIGNATURES {
        let matches = signature
            .required
            .iter()
            .all(|aliases| table::find_column(&index, aliases).is_some());
        if matches {
            debug!(
                dataset_type = %signature.dataset_type,
                columns = headers.len(),
                "header signature matched"
            );
            return Ok(Detection::Recognized {
                dataset_type: signature.dataset_type,
                headers,
            });
        }
    }

    Ok(Detection::Unrecognized { headers })
}

/// Classify a file, falling back to `fallback` when detection cannot
/// produce a known type.
///
/// Unreadable files and unrecognized signatures are logged as warnings and
/// never abort the upload. Returns the effective type plus the header row
/// when one was readable.
pub fn detect_or_fallback(
    bytes: &[u8],
    filename: &str,
    fallback: DatasetType,
) -> (DatasetType, Option<Vec<String>>) {
    match detect_dataset_type(bytes, filename) {
        Ok(Detection::Recognized {
            dataset_type,
            headers,
        }) => (dataset_type, Some(headers)),
        Ok(Detection::Unrecognized { headers }) => {
            warn!(
                filename,
                %fallback,
                "headers matched no known signature, using fallback type"
            );
            (fallback, Some(headers))
        }
        Err(e) => {
            warn!(filename, %fallback, error = %e, "detection failed, using fallback type");
            (fallback, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_manual_adjustments() {
        let bytes = b"Date,Product,Amount,Note\n2024-01-15,pro,12.50,correction\n";
        let detection = detect_dataset_type(bytes, "adjustments.csv").unwrap();
        assert_eq!(
            detection.dataset_type(),
            Some(DatasetType::ManualAdjustments)
        );
        assert_eq!(detection.headers()[3], "Note");
    }

    #[test]
    fn test_detect_raw_usage() {
        let bytes = b"Date,Product,Tokens,User ID\n2024-01-15,pro,1500,u1\n";
        let detection = detect_dataset_type(bytes, "usage.csv").unwrap();
        assert_eq!(detection.dataset_type(), Some(DatasetType::RawUsage));
    }

    #[test]
    fn test_detect_quota_attainment() {
        let bytes = b"Date,Transaction ID,Product,Amount\n2024-01-15,t1,pro,99.00\n";
        let detection = detect_dataset_type(bytes, "quota.csv").unwrap();
        assert_eq!(detection.dataset_type(), Some(DatasetType::QuotaAttainment));
    }

    #[test]
    fn test_detection_tolerates_reordering_and_case() {
        let bytes = b"PRODUCT,tokens,dAtE\n pro,1,2024-01-15\n";
        let detection = detect_dataset_type(bytes, "usage.csv").unwrap();
        assert_eq!(detection.dataset_type(), Some(DatasetType::RawUsage));
    }

    #[test]
    fn test_header_variants() {
        let bytes = b"Usage Date,Plan,Token Count\n2024-01-15,base,7\n";
        let detection = detect_dataset_type(bytes, "usage.csv").unwrap();
        assert_eq!(detection.dataset_type(), Some(DatasetType::RawUsage));
    }

    #[test]
    fn test_unrecognized_headers() {
        let bytes = b"Foo,Bar,Baz\n1,2,3\n";
        let detection = detect_dataset_type(bytes, "mystery.csv").unwrap();
        assert_eq!(detection.dataset_type(), None);
        assert_eq!(detection.headers(), &["Foo", "Bar", "Baz"]);
    }

    #[test]
    fn test_fallback_on_unrecognized() {
        let bytes = b"Foo,Bar\n1,2\n";
        let (dataset_type, headers) =
            detect_or_fallback(bytes, "mystery.csv", DatasetType::ManualAdjustments);
        assert_eq!(dataset_type, DatasetType::ManualAdjustments);
        assert_eq!(headers.unwrap(), vec!["Foo", "Bar"]);
    }

    #[test]
    fn test_fallback_on_unreadable() {
        let (dataset_type, headers) =
            detect_or_fallback(b"", "empty.csv", DatasetType::ManualAdjustments);
        assert_eq!(dataset_type, DatasetType::ManualAdjustments);
        assert!(headers.is_none());
    }

    #[test]
    fn test_detect_xlsx_headers() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Date").unwrap();
        sheet.write_string(0, 1, "Transaction ID").unwrap();
        sheet.write_string(0, 2, "Product").unwrap();
        sheet.write_string(0, 3, "Amount").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let detection = detect_dataset_type(&bytes, "quota.xlsx").unwrap();
        assert_eq!(detection.dataset_type(), Some(DatasetType::QuotaAttainment));
    }
}
