//! File-backed data source with optional background loading.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use parking_lot::{Mutex, MutexGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

use tabula_core::{DataSource, Record, RowStore};

use crate::config::{FileFormat, LoadOptions};
use crate::error::{Error, Result};
use crate::hooks::Hooks;
use crate::loader::load_into;
use crate::pipeline::LoadReport;

#[derive(Default)]
struct Outcome {
    report: Option<LoadReport>,
    error: Option<String>,
}

struct Worker {
    done: Receiver<()>,
    handle: JoinHandle<()>,
}

/// A file loaded into a shared [`RowStore`].
///
/// With `use_threading` the load runs on a background thread and
/// [`FileDataSource::load`] returns immediately; use
/// [`FileDataSource::wait_for_load`] to block until it finishes. The store is
/// locked per chunk, so it can be paged while a chunked load is running.
///
/// ```no_run
/// use std::time::Duration;
/// use tabula_ingest::{FileDataSource, Hooks, LoadOptions};
///
/// let options = LoadOptions { use_threading: true, ..LoadOptions::default() };
/// let mut source = FileDataSource::new("people.csv", options, Hooks::new())?;
/// source.load()?;
/// assert!(source.wait_for_load(Duration::from_secs(5)));
/// println!("{} rows", source.store().len());
/// # Ok::<(), tabula_ingest::Error>(())
/// ```
pub struct FileDataSource {
    path: PathBuf,
    format: FileFormat,
    options: Arc<LoadOptions>,
    hooks: Arc<Hooks>,
    store: Arc<Mutex<RowStore>>,
    outcome: Arc<Mutex<Outcome>>,
    worker: Option<Worker>,
}

impl FileDataSource {
    /// Creates a source for an existing file. Nothing is read yet.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the path does not exist and
    /// `Error::Config` if the options are invalid.
    pub fn new(path: impl AsRef<Path>, options: LoadOptions, hooks: Hooks) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::NotFound(path));
        }
        options.validate()?;
        let format = options.file_format.resolve(&path, options.json_lines);
        debug!(path = %path.display(), format = %format, "file source created");
        Ok(Self {
            path,
            format,
            options: Arc::new(options),
            hooks: Arc::new(hooks),
            store: Arc::new(Mutex::new(RowStore::new())),
            outcome: Arc::new(Mutex::new(Outcome::default())),
            worker: None,
        })
    }

    /// Loads into `store` instead of a fresh default store.
    #[must_use]
    pub fn with_store(mut self, store: RowStore) -> Self {
        self.store = Arc::new(Mutex::new(store));
        self
    }

    /// Reads the file into the store.
    ///
    /// Synchronous loads report failures to the `on_error` hook when one is
    /// set and return `Ok`; without a hook the error is returned. Threaded
    /// loads return immediately; their failures go to `on_error` or, without
    /// a hook, to the log and [`FileDataSource::last_error`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Worker` if a background load is still running,
    /// `Error::Io` if the thread cannot be spawned, or the load error in
    /// synchronous mode.
    pub fn load(&mut self) -> Result<()> {
        if self.is_loading() {
            return Err(Error::Worker("a load is already running".to_string()));
        }
        self.reap();
        *self.outcome.lock() = Outcome::default();

        if !self.options.use_threading {
            let result = run_load(
                &self.path,
                self.format,
                &self.options,
                &self.hooks,
                &self.store,
                &self.outcome,
            );
            return match result {
                Err(err) if !self.hooks.error(&err) => Err(err),
                _ => Ok(()),
            };
        }

        let (tx, rx) = bounded(1);
        let path = self.path.clone();
        let format = self.format;
        let options = Arc::clone(&self.options);
        let hooks = Arc::clone(&self.hooks);
        let store = Arc::clone(&self.store);
        let outcome = Arc::clone(&self.outcome);

        let handle = thread::Builder::new()
            .name("tabula-loader".to_string())
            .spawn(move || {
                if let Err(err) = run_load(&path, format, &options, &hooks, &store, &outcome) {
                    if !hooks.error(&err) {
                        error!(code = err.code(), error = %err, path = %path.display(), "background load failed");
                    }
                }
                let _ = tx.send(());
            })?;

        self.worker = Some(Worker { done: rx, handle });
        debug!(path = %self.path.display(), "background load started");
        Ok(())
    }

    /// Blocks until a background load finishes or `timeout` elapses.
    ///
    /// Returns true if no load is running when this returns. The load keeps
    /// running after a timeout.
    pub fn wait_for_load(&mut self, timeout: Duration) -> bool {
        let Some(worker) = &self.worker else {
            return true;
        };
        match worker.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.reap();
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
        }
    }

    /// Whether a background load is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Joins a finished worker, recording a panic as the load error.
    fn reap(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        if worker.handle.join().is_err() {
            error!(path = %self.path.display(), "loader thread panicked");
            self.outcome.lock().error = Some("loader thread panicked".to_string());
        }
    }

    /// Report of the last successful load.
    #[must_use]
    pub fn last_report(&self) -> Option<LoadReport> {
        self.outcome.lock().report.clone()
    }

    /// Message of the last failed load.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.outcome.lock().error.clone()
    }

    /// Locks the store.
    ///
    /// Holding the guard blocks a running load at its next write.
    pub fn store(&self) -> MutexGuard<'_, RowStore> {
        self.store.lock()
    }

    /// Shared handle to the store.
    #[must_use]
    pub fn shared_store(&self) -> Arc<Mutex<RowStore>> {
        Arc::clone(&self.store)
    }

    /// Consumes the source and returns its store.
    ///
    /// The rows are cloned only if a background load still holds the store.
    #[must_use]
    pub fn into_store(mut self) -> RowStore {
        if !self.is_loading() {
            self.reap();
        }
        match Arc::try_unwrap(self.store) {
            Ok(store) => store.into_inner(),
            Err(shared) => shared.lock().clone(),
        }
    }

    /// Source path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolved file format.
    #[must_use]
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load options.
    #[must_use]
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }
}

impl std::fmt::Debug for FileDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDataSource")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}

fn run_load(
    path: &Path,
    format: FileFormat,
    options: &LoadOptions,
    hooks: &Hooks,
    store: &Mutex<RowStore>,
    outcome: &Mutex<Outcome>,
) -> Result<()> {
    match load_into(path, format, options, hooks, store) {
        Ok(report) => {
            outcome.lock().report = Some(report);
            Ok(())
        }
        Err(err) => {
            outcome.lock().error = Some(err.to_string());
            Err(err)
        }
    }
}

impl DataSource for FileDataSource {
    fn get_page(&mut self, page: Option<usize>) -> Vec<Record> {
        self.store.lock().get_page(page)
    }

    fn next_page(&mut self) -> Vec<Record> {
        self.store.lock().next_page()
    }

    fn prev_page(&mut self) -> Vec<Record> {
        self.store.lock().prev_page()
    }

    fn has_next_page(&self) -> bool {
        self.store.lock().has_next_page()
    }

    fn total_count(&self) -> usize {
        self.store.lock().total_count()
    }

    fn columns(&self) -> Vec<String> {
        self.store.lock().columns()
    }

    fn set_filter(&mut self, expr: &str) -> tabula_core::Result<()> {
        self.store.lock().set_filter(expr)
    }

    fn set_sort(&mut self, expr: &str) -> tabula_core::Result<()> {
        self.store.lock().set_sort(expr)
    }

    fn select_all(&mut self, current_page_only: bool) -> usize {
        self.store.lock().select_all(current_page_only)
    }

    fn unselect_all(&mut self, current_page_only: bool) -> usize {
        self.store.lock().unselect_all(current_page_only)
    }

    fn selected_count(&self) -> usize {
        self.store.lock().selected_count()
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
