//! CSV to records conversion.

use super::{infer_scalar, unique_headers};
use crate::core::errors::{AuditError, AuditResult};
use serde_json::{Map, Value};

/// Parses a CSV file with a header row into one JSON object per record.
///
/// Short rows are padded with `null`; fields beyond the header are dropped.
pub fn csv_to_records(bytes: &[u8]) -> AuditResult<Value> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AuditError::conversion("csv", "failed to read header row", e))?;
    let headers = unique_headers(headers.iter().map(str::to_string));

    let mut records = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AuditError::conversion("csv", format!("failed to read record {}", line + 1), e)
        })?;
        if record.len() > headers.len() {
            tracing::debug!(
                record = line + 1,
                fields = record.len(),
                columns = headers.len(),
                "dropping fields beyond header"
            );
        }

        let mut row = Map::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            let value = record.get(idx).map(infer_scalar).unwrap_or(Value::Null);
            row.insert(header.clone(), value);
        }
        records.push(Value::Object(row));
    }

    Ok(Value::Array(records))
}
