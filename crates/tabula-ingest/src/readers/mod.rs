//! Format readers.
//!
//! Every reader yields raw records in batches; the transformation pipeline
//! runs on top of them. Batching lets chunked loading keep only one chunk of
//! parsed rows in memory for delimited and JSON Lines sources.

pub mod csv_file;
pub mod encoding;
pub mod json_file;

pub use encoding::Encoding;

use std::path::Path;

use serde_json::Value;
use tabula_core::value::record_from_value;
use tabula_core::Record;

use crate::config::{FileFormat, LoadOptions};
use crate::error::{Error, Result};

/// Column used when a JSON element is not an object.
pub const VALUE_COLUMN: &str = "value";

/// A source of raw records.
pub trait RecordReader: Send {
    /// Format being read.
    fn format(&self) -> FileFormat;

    /// Reads up to `max` records. An empty batch means the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input or I/O failure.
    fn next_batch(&mut self, max: usize) -> Result<Vec<Record>>;

    /// Reads every remaining record.
    ///
    /// # Errors
    ///
    /// Returns the first read error.
    fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut all = Vec::new();
        loop {
            let batch = self.next_batch(4096)?;
            if batch.is_empty() {
                return Ok(all);
            }
            all.extend(batch);
        }
    }
}

/// Opens a reader for a resolved (non-`Auto`) format.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its header cannot be
/// read, or if `format` is `Auto`.
pub fn open_reader(
    path: &Path,
    format: FileFormat,
    options: &LoadOptions,
) -> Result<Box<dyn RecordReader>> {
    let encoding = Encoding::parse(&options.encoding)?;
    match format {
        FileFormat::Csv | FileFormat::Tsv => Ok(Box::new(csv_file::CsvReader::open(
            path, format, encoding, options,
        )?)),
        FileFormat::Json => Ok(Box::new(json_file::JsonReader::open(
            path,
            encoding,
            options.json_orient,
        )?)),
        FileFormat::Jsonl => Ok(Box::new(json_file::JsonLinesReader::open(path, encoding)?)),
        FileFormat::Auto => Err(Error::Config(
            "file format must be resolved before opening a reader".to_string(),
        )),
    }
}

/// Objects become records; anything else is wrapped as `{"value": ...}`.
pub(crate) fn wrap_value(value: Value) -> Record {
    match value {
        Value::Object(_) => record_from_value(value),
        other => {
            let mut record = Record::new();
            record.insert(VALUE_COLUMN.to_string(), other);
            record
        }
    }
}
