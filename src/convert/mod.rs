//! Structured file conversion.
//!
//! Spreadsheets and XML exports skip OCR entirely: they are parsed into
//! JSON (`structuredData`) and forwarded to the audit step as-is.
//!
//! | extension       | converter            | output              |
//! |-----------------|----------------------|---------------------|
//! | `.csv`          | [`csv_to_records`]   | array of records    |
//! | `.xlsx`, `.xls` | [`excel_to_records`] | array of records    |
//! | `.xml`          | [`xml_to_json`]      | object              |

pub mod csv;
pub mod excel;
pub mod xml;

pub use self::csv::csv_to_records;
pub use self::excel::excel_to_records;
pub use self::xml::xml_to_json;

use crate::core::errors::{AuditError, AuditResult};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// File formats handled by [`convert_structured`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Csv,
    Excel,
    Xml,
}

impl StructuredFormat {
    /// Picks the format from a file name's extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".csv") {
            Some(StructuredFormat::Csv)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Some(StructuredFormat::Excel)
        } else if lower.ends_with(".xml") {
            Some(StructuredFormat::Xml)
        } else {
            None
        }
    }
}

/// Converts an uploaded structured file into `structuredData` JSON.
pub fn convert_structured(file_name: &str, bytes: &[u8]) -> AuditResult<Value> {
    let format = StructuredFormat::from_file_name(file_name).ok_or_else(|| {
        AuditError::UnsupportedFormat {
            file_name: file_name.to_string(),
        }
    })?;

    tracing::debug!(file_name, ?format, size = bytes.len(), "converting structured file");
    match format {
        StructuredFormat::Csv => csv_to_records(bytes),
        StructuredFormat::Excel => excel_to_records(bytes),
        StructuredFormat::Xml => xml_to_json(bytes),
    }
}

/// Types a textual cell: integer, float, boolean, or string; empty is `null`.
pub(crate) fn infer_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Some(float) = raw
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
    {
        return Value::Number(float);
    }
    match raw {
        "True" | "true" | "TRUE" => Value::Bool(true),
        "False" | "false" | "FALSE" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Makes column names unique by suffixing repeats with `.1`, `.2`, ...
pub(crate) fn unique_headers(headers: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|header| {
            let count = seen.entry(header.clone()).or_insert(0);
            let name = if *count == 0 {
                header
            } else {
                format!("{header}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}
