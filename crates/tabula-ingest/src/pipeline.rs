//! Per-record transformation pipeline.
//!
//! Steps run in a fixed order for every raw record:
//!
//! 1. row filter (`row_filter` expression, then the row-filter hook)
//! 2. `columns_to_load` projection
//! 3. `column_renames`
//! 4. `default_values` for missing or null columns
//! 5. casts (`column_types`, then caster hooks)
//! 6. column transform hooks
//! 7. row transform hook
//!
//! Cast and transform failures keep the original value and are recorded in
//! the [`LoadReport`].

use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::time::Duration;

use tabula_core::{FilterExpr, Record};

use crate::config::{FileFormat, LoadOptions, LoadingStrategy};
use crate::error::{Error, Result};
use crate::hooks::{FieldFn, Hooks};

/// Field errors kept verbatim in a report; later ones are only counted.
pub const MAX_FIELD_ERRORS: usize = 1000;

/// Pipeline step at which a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStage {
    /// Named or custom cast.
    Cast,
    /// Column transform hook.
    Transform,
}

/// A swallowed per-field failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Zero-based index of the source record.
    pub row: usize,
    /// Column name (after renames).
    pub column: String,
    /// Where it failed.
    pub stage: FieldStage,
    /// Caster or transform message.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.stage {
            FieldStage::Cast => "cast",
            FieldStage::Transform => "transform",
        };
        write!(
            f,
            "row {} column '{}' ({stage}): {}",
            self.row, self.column, self.message
        )
    }
}

/// Outcome of a load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Format that was read.
    pub format: FileFormat,
    /// Strategy after resolving `auto`.
    pub requested: LoadingStrategy,
    /// Strategy that actually ran.
    pub strategy: LoadingStrategy,
    /// Row estimate used for strategy selection and progress.
    pub estimated_rows: usize,
    /// Raw records read from the source.
    pub rows_read: usize,
    /// Records dropped by the row filter.
    pub rows_filtered: usize,
    /// Records handed to the row store.
    pub rows_loaded: usize,
    /// Chunks written to the store.
    pub chunks: usize,
    /// First [`MAX_FIELD_ERRORS`] field failures.
    pub field_errors: Vec<FieldError>,
    /// Total field failures, including those not kept.
    pub field_error_count: usize,
    /// Wall-clock time of the load.
    pub elapsed: Duration,
}

impl LoadReport {
    /// Rows loaded per second.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rows_loaded as f64 / secs
        } else {
            0.0
        }
    }

    pub(crate) fn record_field_error(
        &mut self,
        row: usize,
        column: &str,
        stage: FieldStage,
        message: String,
    ) {
        self.field_error_count += 1;
        if self.field_errors.len() < MAX_FIELD_ERRORS {
            self.field_errors.push(FieldError {
                row,
                column: column.to_string(),
                stage,
                message,
            });
        }
    }
}

/// Compiled transformation steps.
pub struct Pipeline<'a> {
    options: &'a LoadOptions,
    hooks: &'a Hooks,
    row_filter: Option<FilterExpr>,
    allow: IndexSet<&'a str>,
}

impl<'a> Pipeline<'a> {
    /// Compiles the option-driven steps.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `row_filter` does not parse.
    pub fn new(options: &'a LoadOptions, hooks: &'a Hooks) -> Result<Self> {
        let row_filter = match &options.row_filter {
            Some(expr) => FilterExpr::parse(expr)
                .map_err(|e| Error::Config(format!("row_filter: {e}")))?,
            None => None,
        };
        Ok(Self {
            options,
            hooks,
            row_filter,
            allow: options.columns_to_load.iter().map(String::as_str).collect(),
        })
    }

    /// Runs every step on one raw record.
    ///
    /// Returns `None` if the record is filtered out. Counters in `report`
    /// are updated either way.
    pub fn apply(&self, record: Record, report: &mut LoadReport) -> Option<Record> {
        let row = report.rows_read;
        report.rows_read += 1;

        // 1. filter
        let keep = self.row_filter.as_ref().map_or(true, |f| f.matches(&record))
            && self.hooks.row_filter.as_ref().map_or(true, |f| f(&record));
        if !keep {
            report.rows_filtered += 1;
            return None;
        }

        // 2. projection
        let mut record = record;
        if !self.allow.is_empty() {
            record.retain(|column, _| self.allow.contains(column.as_str()));
        }

        // 3. renames
        if !self.options.column_renames.is_empty() {
            record = record
                .into_iter()
                .map(|(column, value)| match self.options.column_renames.get(&column) {
                    Some(new) => (new.clone(), value),
                    None => (column, value),
                })
                .collect();
        }

        // 4. defaults
        for (column, fallback) in &self.options.default_values {
            match record.get_mut(column) {
                Some(value) if !value.is_null() => {}
                Some(value) => *value = fallback.clone(),
                None => {
                    record.insert(column.clone(), fallback.clone());
                }
            }
        }

        // 5. casts
        for (column, ty) in &self.options.column_types {
            if let Some(value) = record.get_mut(column) {
                match ty.cast(&*value) {
                    Ok(cast) => *value = cast,
                    Err(message) => report.record_field_error(row, column, FieldStage::Cast, message),
                }
            }
        }
        self.apply_field_fns(&self.hooks.casters, &mut record, row, FieldStage::Cast, report);

        // 6. transforms
        self.apply_field_fns(
            &self.hooks.transforms,
            &mut record,
            row,
            FieldStage::Transform,
            report,
        );

        // 7. row transform
        if let Some(f) = &self.hooks.row_transform {
            record = f(record);
        }

        report.rows_loaded += 1;
        Some(record)
    }

    fn apply_field_fns(
        &self,
        fns: &IndexMap<String, FieldFn>,
        record: &mut Record,
        row: usize,
        stage: FieldStage,
        report: &mut LoadReport,
    ) {
        for (column, f) in fns {
            let Some(value) = record.get_mut(column) else {
                continue;
            };
            match f(&*value) {
                Ok(new) => *value = new,
                Err(err) => report.record_field_error(row, column, stage, err.to_string()),
            }
        }
    }

    /// Runs the pipeline over a batch, keeping the surviving records.
    pub fn apply_batch(&self, batch: Vec<Record>, report: &mut LoadReport) -> Vec<Record> {
        batch
            .into_iter()
            .filter_map(|record| self.apply(record, report))
            .collect()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
