//! Documents submitted to the audit step.
//!
//! The audit endpoint receives the outputs of earlier extraction and conversion
//! calls, each tagged with the name of the file it came from. Field names are
//! camelCase on the wire.

use crate::extraction::{ExtractionResult, TableCell};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// One document extract to be audited.
///
/// A document carries either `structured_data` (from a CSV, Excel or XML
/// conversion) or the OCR reconstruction fields. When `structured_data` is
/// present the other fields are ignored by the prompt formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDocument {
    #[serde(default = "AuditDocument::default_file_name")]
    pub file_name: String,
    #[serde(default)]
    pub text_lines: Vec<String>,
    #[serde(default)]
    pub form_fields: IndexMap<String, String>,
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
    /// `Some` whenever the key is present, including `"structuredData": null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub structured_data: Option<serde_json::Value>,
    /// Client-side failure recorded for this file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditDocument {
    /// Wraps an OCR reconstruction.
    pub fn from_extraction(file_name: impl Into<String>, result: ExtractionResult) -> Self {
        Self {
            file_name: file_name.into(),
            text_lines: result.text_lines,
            form_fields: result.form_fields,
            table_cells: result.table_cells,
            structured_data: None,
            error: None,
        }
    }

    /// Wraps the output of a structured file conversion.
    pub fn from_structured(file_name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            file_name: file_name.into(),
            text_lines: Vec::new(),
            form_fields: IndexMap::new(),
            table_cells: Vec::new(),
            structured_data: Some(data),
            error: None,
        }
    }

    fn default_file_name() -> String {
        "Unknown File".to_string()
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}
