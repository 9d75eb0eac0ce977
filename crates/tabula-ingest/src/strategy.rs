//! Row-count estimation and loading strategy selection.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::{FileFormat, LoadOptions, LoadingStrategy};
use crate::error::{Error, Result};

/// Lines sampled from a line-oriented file to size an average row.
pub const SAMPLE_LINES: usize = 100;

/// Assumed bytes per record for a JSON document.
pub const JSON_BYTES_PER_ROW: u64 = 100;

/// Above `max_memory_rows` but below this multiple of it, `auto` picks chunked.
pub const CHUNKED_FACTOR: usize = 5;

/// Estimates how many records a file holds.
///
/// Line-oriented formats sample the first [`SAMPLE_LINES`] lines and divide
/// the file size by the average line length. A file that fits in the sample
/// is counted exactly. JSON documents use a flat bytes-per-row proxy.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn estimate_row_count(path: &Path, format: FileFormat, options: &LoadOptions) -> Result<usize> {
    let size = std::fs::metadata(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?
        .len();

    if format == FileFormat::Json {
        return Ok(usize::try_from(size / JSON_BYTES_PER_ROW).unwrap_or(usize::MAX));
    }

    let mut reader = BufReader::new(File::open(path)?);
    let mut line = Vec::new();
    let mut lines = 0usize;
    let mut blank = 0usize;
    let mut sampled = 0u64;
    let mut exhausted = false;
    while lines < SAMPLE_LINES {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            exhausted = true;
            break;
        }
        lines += 1;
        sampled += n as u64;
        if line.iter().all(u8::is_ascii_whitespace) {
            blank += 1;
        }
    }
    if !exhausted && sampled == size {
        exhausted = true;
    }

    let overhead = if format.is_delimited() {
        options.skip_rows + usize::from(options.has_header) * (options.header_row + 1)
    } else {
        0
    };

    let rows = if exhausted {
        lines - blank
    } else if sampled == 0 {
        0
    } else {
        let avg = sampled as f64 / lines as f64;
        (size as f64 / avg).round() as usize
    };
    Ok(rows.saturating_sub(overhead))
}

/// Strategy `auto` resolves to for an estimate.
///
/// The result is eager below `max_memory_rows`, chunked below
/// [`CHUNKED_FACTOR`] times that, and hybrid above.
#[must_use]
pub fn choose_strategy(estimated_rows: usize, max_memory_rows: usize) -> LoadingStrategy {
    if estimated_rows < max_memory_rows {
        LoadingStrategy::Eager
    } else if estimated_rows < max_memory_rows.saturating_mul(CHUNKED_FACTOR) {
        LoadingStrategy::Chunked
    } else {
        LoadingStrategy::Hybrid
    }
}

/// Splits a requested strategy into `(resolved, executed)`.
///
/// `resolved` is the request with `auto` replaced by [`choose_strategy`].
/// `executed` is what actually runs: lazy and hybrid read eagerly.
#[must_use]
pub fn resolve_strategy(
    requested: LoadingStrategy,
    estimated_rows: usize,
    max_memory_rows: usize,
) -> (LoadingStrategy, LoadingStrategy) {
    let resolved = match requested {
        LoadingStrategy::Auto => choose_strategy(estimated_rows, max_memory_rows),
        other => other,
    };
    let executed = match resolved {
        LoadingStrategy::Lazy | LoadingStrategy::Hybrid => {
            tracing::warn!(
                strategy = %resolved,
                estimated_rows,
                "strategy not implemented, loading eagerly"
            );
            LoadingStrategy::Eager
        }
        other => other,
    };
    (resolved, executed)
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
