//! JSON and JSON Lines readers.

use std::io::{BufRead, Lines};
use std::path::Path;

use serde_json::{Map, Value};
use tabula_core::Record;

use super::encoding::decode_error;
use super::{wrap_value, Encoding, RecordReader};
use crate::config::{FileFormat, JsonOrient};
use crate::error::{Error, Result};

/// Keys recognised as a records container at the top of a JSON document.
const CONTAINER_KEYS: [&str; 2] = ["records", "data"];

/// Reader for a whole JSON document.
///
/// The document is parsed at once; batching only bounds how many records
/// are handed to the pipeline at a time.
pub struct JsonReader {
    records: std::vec::IntoIter<Record>,
}

impl JsonReader {
    /// Parses a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the document is malformed.
    pub fn open(path: &Path, encoding: Encoding, orient: JsonOrient) -> Result<Self> {
        let root: Value = serde_json::from_reader(encoding.open(path)?)?;
        Ok(Self::from_value(root, orient))
    }

    /// Builds a reader over an already-parsed document.
    #[must_use]
    pub fn from_value(root: Value, orient: JsonOrient) -> Self {
        let records = document_records(root, orient);
        tracing::debug!(rows = records.len(), ?orient, "parsed JSON document");
        Self {
            records: records.into_iter(),
        }
    }
}

impl RecordReader for JsonReader {
    fn format(&self) -> FileFormat {
        FileFormat::Json
    }

    fn next_batch(&mut self, max: usize) -> Result<Vec<Record>> {
        Ok(self.records.by_ref().take(max).collect())
    }
}

/// Splits a JSON document into records.
///
/// - array: one record per element
/// - object with a `records`/`data` array: that array
/// - object whose values are all objects: one record per value
/// - any other object: a single record
/// - scalar: a single `{"value": ...}` record
#[must_use]
pub fn document_records(root: Value, orient: JsonOrient) -> Vec<Record> {
    match root {
        Value::Array(items) => items.into_iter().map(wrap_value).collect(),
        Value::Object(map) if orient == JsonOrient::Columns => columns_to_records(map),
        Value::Object(mut map) => {
            for key in CONTAINER_KEYS {
                if matches!(map.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(items)) = map.remove(key) {
                        return items.into_iter().map(wrap_value).collect();
                    }
                }
            }
            if !map.is_empty() && map.values().all(Value::is_object) {
                return map.into_iter().map(|(_, v)| wrap_value(v)).collect();
            }
            vec![wrap_value(Value::Object(map))]
        }
        scalar => vec![wrap_value(scalar)],
    }
}

/// Zips `{"col": [v0, v1, ...], ...}` into rows. Short columns pad with null.
fn columns_to_records(map: Map<String, Value>) -> Vec<Record> {
    let columns: Vec<(String, Vec<Value>)> = map
        .into_iter()
        .map(|(name, values)| {
            let values = match values {
                Value::Array(items) => items,
                Value::Object(index) => index.into_iter().map(|(_, v)| v).collect(),
                scalar => vec![scalar],
            };
            (name, values)
        })
        .collect();

    let rows = columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
    (0..rows)
        .map(|i| {
            columns
                .iter()
                .map(|(name, values)| (name.clone(), values.get(i).cloned().unwrap_or(Value::Null)))
                .collect()
        })
        .collect()
}

/// Reader for JSON Lines: one JSON value per non-blank line.
pub struct JsonLinesReader {
    lines: Lines<Box<dyn BufRead + Send>>,
    line_no: usize,
}

impl JsonLinesReader {
    /// Opens a JSON Lines file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened.
    pub fn open(path: &Path, encoding: Encoding) -> Result<Self> {
        Ok(Self::from_input(encoding.open(path)?))
    }

    /// Builds a reader over an already-decoded input.
    #[must_use]
    pub fn from_input(input: Box<dyn BufRead + Send>) -> Self {
        Self {
            lines: input.lines(),
            line_no: 0,
        }
    }
}

impl RecordReader for JsonLinesReader {
    fn format(&self) -> FileFormat {
        FileFormat::Jsonl
    }

    fn next_batch(&mut self, max: usize) -> Result<Vec<Record>> {
        let mut batch = Vec::with_capacity(max.min(1024));
        while batch.len() < max {
            let Some(line) = self.lines.next() else {
                break;
            };
            self.line_no += 1;
            let line = line.map_err(|e| decode_error(e, "utf-8"))?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line)
                .map_err(|e| Error::Json(format!("line {}: {e}", self.line_no)))?;
            batch.push(wrap_value(value));
        }
        Ok(batch)
    }
}

#[cfg(test)]
#[path = "json_file_tests.rs"]
mod tests;
