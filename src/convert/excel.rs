//! Excel workbook to records conversion.

use super::unique_headers;
use crate::core::errors::{AuditError, AuditResult};
use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
use serde_json::{Map, Number, Value};
use std::io::Cursor;

/// Reads the first worksheet into one JSON object per row.
///
/// The first row supplies column names. Rows with no populated cell are
/// skipped.
pub fn excel_to_records(bytes: &[u8]) -> AuditResult<Value> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| AuditError::conversion("excel", "failed to open workbook", e))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => {
            range.map_err(|e| AuditError::conversion("excel", "failed to read first sheet", e))?
        }
        None => {
            return Err(AuditError::conversion(
                "excel",
                "workbook has no worksheets",
                std::io::Error::new(std::io::ErrorKind::InvalidData, "no worksheets"),
            ));
        }
    };

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Value::Array(Vec::new()));
    };
    let headers = unique_headers(header_row.iter().enumerate().map(|(idx, cell)| {
        match cell {
            Data::Empty => format!("Unnamed: {idx}"),
            other => other.to_string(),
        }
    }));

    let records = rows
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| {
            let mut record = Map::with_capacity(headers.len());
            for (idx, header) in headers.iter().enumerate() {
                let value = row.get(idx).map(cell_to_json).unwrap_or(Value::Null);
                record.insert(header.clone(), value);
            }
            Value::Object(record)
        })
        .collect();

    Ok(Value::Array(records))
}

fn cell_to_json(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => Value::String(s.clone()),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| Value::String(dt.to_string()))
            .unwrap_or(Value::Null),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(e.to_string()),
    }
}
