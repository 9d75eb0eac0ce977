//! CSV export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::{is_selected, RowStore};
use crate::error::Result;
use crate::value::{to_display_string, Record};

impl RowStore {
    fn export_rows(&self, include_all: bool) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| include_all || is_selected(r))
            .collect()
    }

    /// Writes rows as CSV to `path` and returns how many were written.
    ///
    /// `include_all` exports every row; otherwise only selected rows. Rows
    /// keep insertion order and the header is the store's column set. When
    /// there is nothing to export no file is created and 0 is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P, include_all: bool) -> Result<usize> {
        let rows = self.export_rows(include_all);
        if rows.is_empty() {
            tracing::info!("nothing to export");
            return Ok(0);
        }
        let file = File::create(path.as_ref())?;
        let written = self.write_csv(file, &rows)?;
        tracing::info!(rows = written, path = %path.as_ref().display(), "exported CSV");
        Ok(written)
    }

    /// Writes rows as CSV to any writer. Same row rules as
    /// [`RowStore::export_to_csv`], except the header is written even when
    /// there are no rows.
    ///
    /// # Errors
    ///
    /// Returns an error on write failure.
    pub fn export_to_writer<W: Write>(&self, writer: W, include_all: bool) -> Result<usize> {
        let rows = self.export_rows(include_all);
        self.write_csv(writer, &rows)
    }

    fn write_csv<W: Write>(&self, writer: W, rows: &[&Record]) -> Result<usize> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.columns.iter())?;
        for row in rows {
            wtr.write_record(
                self.columns
                    .iter()
                    .map(|col| row.get(col).map(to_display_string).unwrap_or_default()),
            )?;
        }
        wtr.flush()?;
        Ok(rows.len())
    }
}
