//! CSV and TSV reader.

use std::io::BufRead;
use std::path::Path;

use serde_json::Value;
use tabula_core::Record;

use super::{Encoding, RecordReader};
use crate::config::{FileFormat, LoadOptions};
use crate::error::Result;
use crate::types::infer_value;

/// Delimited-text reader over the `csv` crate.
pub struct CsvReader {
    format: FileFormat,
    reader: csv::Reader<Box<dyn BufRead + Send>>,
    headers: Vec<String>,
    infer_types: bool,
    row: csv::StringRecord,
}

impl CsvReader {
    /// Opens a delimited file, skipping `skip_rows` lines and any lines
    /// before `header_row`, and reads the header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the header is malformed.
    pub fn open(
        path: &Path,
        format: FileFormat,
        encoding: Encoding,
        options: &LoadOptions,
    ) -> Result<Self> {
        Self::from_input(encoding.open(path)?, format, options)
    }

    /// Builds a reader over an already-decoded input.
    ///
    /// # Errors
    ///
    /// Returns an error if the leading lines or the header cannot be read.
    pub fn from_input(
        mut input: Box<dyn BufRead + Send>,
        format: FileFormat,
        options: &LoadOptions,
    ) -> Result<Self> {
        let mut skip = options.skip_rows;
        if options.has_header {
            skip += options.header_row;
        }
        skip_lines(&mut input, skip)?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter_for(format))
            .quote(options.quote_byte())
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(input);

        let headers = if options.has_header {
            reader.headers()?.iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };
        tracing::debug!(%format, columns = headers.len(), skipped = skip, "opened delimited source");

        Ok(Self {
            format,
            reader,
            headers,
            infer_types: options.infer_types,
            row: csv::StringRecord::new(),
        })
    }

    /// Header names (empty when the file has no header).
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn to_record(&self) -> Record {
        self.row
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let name = self
                    .headers
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("col_{i}"));
                let value = if self.infer_types {
                    infer_value(field)
                } else {
                    Value::String(field.to_string())
                };
                (name, value)
            })
            .collect()
    }
}

impl RecordReader for CsvReader {
    fn format(&self) -> FileFormat {
        self.format
    }

    fn next_batch(&mut self, max: usize) -> Result<Vec<Record>> {
        let mut batch = Vec::with_capacity(max.min(1024));
        while batch.len() < max {
            if !self.reader.read_record(&mut self.row)? {
                break;
            }
            batch.push(self.to_record());
        }
        Ok(batch)
    }
}

/// Discards `n` physical lines.
fn skip_lines(input: &mut dyn BufRead, n: usize) -> Result<()> {
    let mut line = Vec::new();
    for _ in 0..n {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "csv_file_tests.rs"]
mod tests;
