//! Code-valued load options: casters, transforms and callbacks.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

use tabula_core::Record;

use crate::error::Error;
use crate::pipeline::LoadReport;

/// Error type returned by user casters and transforms.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Per-field conversion.
pub type FieldFn = Box<dyn Fn(&Value) -> Result<Value, HookError> + Send + Sync>;
/// Predicate over a raw source record.
pub type RowPredicate = Box<dyn Fn(&Record) -> bool + Send + Sync>;
/// Whole-record rewrite.
pub type RowFn = Box<dyn Fn(Record) -> Record + Send + Sync>;
/// Progress callback: `(rows_read, estimated_total)`.
pub type ProgressFn = Box<dyn Fn(usize, usize) + Send + Sync>;
/// Called once after a successful load.
pub type CompleteFn = Box<dyn Fn(&LoadReport) + Send + Sync>;
/// Called with the error of a failed load.
pub type ErrorFn = Box<dyn Fn(&Error) + Send + Sync>;

/// Callbacks and custom conversions applied while loading.
///
/// All closures are `Send + Sync` so a load can run on a background thread.
#[derive(Default)]
pub struct Hooks {
    pub(crate) casters: IndexMap<String, FieldFn>,
    pub(crate) transforms: IndexMap<String, FieldFn>,
    pub(crate) row_filter: Option<RowPredicate>,
    pub(crate) row_transform: Option<RowFn>,
    pub(crate) on_progress: Option<ProgressFn>,
    pub(crate) on_complete: Option<CompleteFn>,
    pub(crate) on_error: Option<ErrorFn>,
}

impl Hooks {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom caster for a column, run after any named `column_types` cast.
    #[must_use]
    pub fn with_caster<F>(mut self, column: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        self.casters.insert(column.into(), Box::new(f));
        self
    }

    /// Per-column transform, run after all casts.
    #[must_use]
    pub fn with_transform<F>(mut self, column: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        self.transforms.insert(column.into(), Box::new(f));
        self
    }

    /// Drops raw records for which `f` returns false.
    #[must_use]
    pub fn with_row_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.row_filter = Some(Box::new(f));
        self
    }

    /// Final rewrite of each record.
    #[must_use]
    pub fn with_row_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        self.row_transform = Some(Box::new(f));
        self
    }

    /// Progress reporting.
    #[must_use]
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Completion notification.
    #[must_use]
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&LoadReport) + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Failure notification. When set, a failed synchronous load reports
    /// here instead of returning the error.
    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    pub(crate) fn progress(&self, current: usize, total: usize) {
        if let Some(f) = &self.on_progress {
            f(current, total);
        }
    }

    pub(crate) fn complete(&self, report: &LoadReport) {
        if let Some(f) = &self.on_complete {
            f(report);
        }
    }

    /// Forwards an error to `on_error`. Returns false when no handler is set.
    pub(crate) fn error(&self, err: &Error) -> bool {
        match &self.on_error {
            Some(f) => {
                f(err);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("casters", &self.casters.keys().collect::<Vec<_>>())
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .field("row_filter", &self.row_filter.is_some())
            .field("row_transform", &self.row_transform.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
