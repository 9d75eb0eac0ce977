//! Strategy execution: reads a file through the pipeline into a row store.

use parking_lot::Mutex;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use tabula_core::RowStore;

use crate::config::{FileFormat, LoadOptions, LoadingStrategy};
use crate::error::Result;
use crate::hooks::Hooks;
use crate::pipeline::{LoadReport, Pipeline};
use crate::readers::{open_reader, RecordReader};
use crate::strategy::{estimate_row_count, resolve_strategy};

/// Records between progress callbacks during an eager load.
pub const PROGRESS_INTERVAL: usize = 1000;

/// Loads `path` into `store` and returns the report.
///
/// `format` must already be resolved. The store lock is only held while
/// records are written, so readers can page through earlier chunks of a
/// chunked load.
///
/// # Errors
///
/// Returns the first read or configuration error. The store keeps whatever
/// was written before the failure.
pub fn load_into(
    path: &Path,
    format: FileFormat,
    options: &LoadOptions,
    hooks: &Hooks,
    store: &Mutex<RowStore>,
) -> Result<LoadReport> {
    let start = Instant::now();
    let estimated_rows = estimate_row_count(path, format, options)?;
    let (requested, strategy) = resolve_strategy(
        options.loading_strategy,
        estimated_rows,
        options.max_memory_rows,
    );
    let pipeline = Pipeline::new(options, hooks)?;
    let mut reader = open_reader(path, format, options)?;

    info!(
        path = %path.display(),
        format = %format,
        strategy = %strategy,
        estimated_rows,
        "loading file"
    );

    let mut report = LoadReport {
        format,
        requested,
        strategy,
        estimated_rows,
        ..LoadReport::default()
    };

    match strategy {
        LoadingStrategy::Chunked => {
            load_chunked(reader.as_mut(), &pipeline, hooks, store, options.chunk_size, &mut report)?;
        }
        _ => load_eager(reader.as_mut(), &pipeline, hooks, store, &mut report)?,
    }

    report.elapsed = start.elapsed();
    info!(
        rows_read = report.rows_read,
        rows_loaded = report.rows_loaded,
        rows_filtered = report.rows_filtered,
        field_errors = report.field_error_count,
        elapsed_ms = report.elapsed.as_millis(),
        "load complete"
    );
    hooks.complete(&report);
    Ok(report)
}

fn load_eager(
    reader: &mut dyn RecordReader,
    pipeline: &Pipeline<'_>,
    hooks: &Hooks,
    store: &Mutex<RowStore>,
    report: &mut LoadReport,
) -> Result<()> {
    let mut records = Vec::new();
    loop {
        let batch = reader.next_batch(PROGRESS_INTERVAL)?;
        if batch.is_empty() {
            break;
        }
        let full = batch.len() == PROGRESS_INTERVAL;
        records.extend(pipeline.apply_batch(batch, report));
        if full {
            hooks.progress(report.rows_read, report.estimated_rows.max(report.rows_read));
        }
    }

    store.lock().set_records(records);
    report.chunks = 1;
    hooks.progress(report.rows_read, report.rows_read);
    Ok(())
}

fn load_chunked(
    reader: &mut dyn RecordReader,
    pipeline: &Pipeline<'_>,
    hooks: &Hooks,
    store: &Mutex<RowStore>,
    chunk_size: usize,
    report: &mut LoadReport,
) -> Result<()> {
    loop {
        let batch = reader.next_batch(chunk_size)?;
        if batch.is_empty() && report.chunks > 0 {
            break;
        }
        let exhausted = batch.is_empty();
        let chunk = pipeline.apply_batch(batch, report);

        {
            let mut store = store.lock();
            if report.chunks == 0 {
                store.set_records(chunk);
            } else {
                for record in chunk {
                    store.create_record(record);
                }
            }
        }
        report.chunks += 1;
        debug!(chunk = report.chunks, rows_read = report.rows_read, "chunk loaded");
        hooks.progress(report.rows_read, report.estimated_rows.max(report.rows_read));

        if exhausted {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
