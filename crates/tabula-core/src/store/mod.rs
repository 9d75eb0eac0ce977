//! In-memory row store with filtering, sorting, pagination and selection.
//!
//! Records keep insertion order. Filter and sort are compiled when set and
//! applied lazily on every read, so the underlying order never changes
//! because of a sort.
//!
//! The store has no internal locking. Share it across threads behind a
//! mutex, as the ingest crate does.

mod crud;
mod export;
mod selection;
mod source;

pub use selection::SelectionScope;
pub use source::DataSource;

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::config::{StoreConfig, DEFAULT_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::query::{parse_sort, sort_positions, FilterExpr, SortKey};
use crate::value::{
    as_id, is_truthy, record_from_value, Record, ID_COLUMN, MAX_ID, SELECTED_COLUMN,
};

/// Ordered collection of records with an id index.
#[derive(Debug, Clone)]
pub struct RowStore {
    records: Vec<Record>,
    /// id → position in `records`
    positions: FxHashMap<i64, usize>,
    columns: IndexSet<String>,
    filter: Option<FilterExpr>,
    sort_keys: Vec<SortKey>,
    default_filter: Option<FilterExpr>,
    default_sort: Vec<SortKey>,
    page: usize,
    page_size: usize,
    /// High-water mark: ids are never handed out twice within a load.
    /// Past [`MAX_ID`] the lowest free id is used instead.
    next_id: i64,
}

impl Default for RowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RowStore {
    /// Creates an empty store with the default page size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Creates an empty store with the given page size (clamped to at least 1).
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            positions: FxHashMap::default(),
            columns: IndexSet::new(),
            filter: None,
            sort_keys: Vec::new(),
            default_filter: None,
            default_sort: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
            next_id: 1,
        }
    }

    /// Creates an empty store from configuration.
    ///
    /// The configured filter and sort become the defaults that
    /// [`RowStore::set_data`] resets to.
    ///
    /// # Errors
    ///
    /// Returns an error if the page size is zero or a default expression
    /// does not parse.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        if config.page_size == 0 {
            return Err(Error::InvalidArgument(
                "page_size must be positive".to_string(),
            ));
        }
        let mut store = Self::with_page_size(config.page_size);
        store.default_filter = FilterExpr::parse(&config.default_filter)?;
        store.default_sort = parse_sort(&config.default_sort)?;
        store.filter.clone_from(&store.default_filter);
        store.sort_keys.clone_from(&store.default_sort);
        Ok(store)
    }

    // =========================================================================
    // Bulk load
    // =========================================================================

    /// Replaces all rows.
    ///
    /// Non-object values are wrapped as `{"text": ...}`. See
    /// [`RowStore::set_records`] for id and selection handling.
    pub fn set_data<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.set_records(values.into_iter().map(record_from_value).collect());
    }

    /// Replaces all rows with already-built records.
    ///
    /// - records without a usable `id` get their position (1-based) as id,
    ///   or the next free id when that is taken
    /// - ids given as integer strings are normalized to numbers
    /// - `selected` defaults to 0 and is normalized to 0/1
    /// - the column set becomes the union of all keys, in first-seen order
    /// - filter, sort and page cursor reset to their defaults
    pub fn set_records(&mut self, mut records: Vec<Record>) {
        let mut seen: FxHashSet<i64> = FxHashSet::default();
        let mut pending = Vec::new();

        for (pos, record) in records.iter_mut().enumerate() {
            match record.get(ID_COLUMN).and_then(as_id) {
                Some(id) if seen.insert(id) => {
                    record.insert(ID_COLUMN.to_string(), Value::from(id));
                }
                _ => pending.push(pos),
            }
        }

        let mut max_id = seen.iter().copied().max().unwrap_or(0);
        for pos in pending {
            let positional = i64::try_from(pos + 1).unwrap_or(i64::MAX);
            let id = if positional <= MAX_ID && !seen.contains(&positional) {
                positional
            } else if max_id < MAX_ID {
                max_id + 1
            } else {
                smallest_free_id(|id| seen.contains(&id))
            };
            seen.insert(id);
            max_id = max_id.max(id);
            assign_id(&mut records[pos], id);
        }

        self.columns.clear();
        for record in &mut records {
            normalize_selected(record);
            self.columns.extend(record.keys().cloned());
        }

        self.records = records;
        self.next_id = max_id + 1;
        self.rebuild_positions();
        self.filter.clone_from(&self.default_filter);
        self.sort_keys.clone_from(&self.default_sort);
        self.page = 0;

        tracing::debug!(
            rows = self.records.len(),
            columns = self.columns.len(),
            "row store loaded"
        );
    }

    /// Removes all rows and resets filter, sort and cursor.
    pub fn clear(&mut self) {
        self.set_records(Vec::new());
    }

    pub(crate) fn rebuild_positions(&mut self) {
        self.positions.clear();
        for (pos, record) in self.records.iter().enumerate() {
            if let Some(id) = record.get(ID_COLUMN).and_then(as_id) {
                self.positions.insert(id, pos);
            }
        }
    }

    // =========================================================================
    // Filter / sort
    // =========================================================================

    /// Compiles and activates a filter. An empty string clears it.
    ///
    /// The page cursor returns to the first page because the row count
    /// behind it may have changed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the expression is malformed; the previous
    /// filter stays active in that case.
    pub fn set_filter(&mut self, expr: &str) -> Result<()> {
        let filter = FilterExpr::parse(expr)?;
        tracing::debug!(filter = %expr, "filter set");
        self.filter = filter;
        self.page = 0;
        Ok(())
    }

    /// Compiles and activates a sort. An empty string restores insertion order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the expression is malformed; the previous
    /// sort stays active in that case.
    pub fn set_sort(&mut self, expr: &str) -> Result<()> {
        let keys = parse_sort(expr)?;
        tracing::debug!(sort = %expr, keys = keys.len(), "sort set");
        self.sort_keys = keys;
        Ok(())
    }

    /// Active filter, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&FilterExpr> {
        self.filter.as_ref()
    }

    /// Active sort keys (empty = insertion order).
    #[must_use]
    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort_keys
    }

    /// Positions of rows passing the filter, in sorted order.
    pub(crate) fn view(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = match &self.filter {
            Some(filter) => (0..self.records.len())
                .filter(|&pos| filter.matches(&self.records[pos]))
                .collect(),
            None => (0..self.records.len()).collect(),
        };
        sort_positions(&mut positions, &self.records, &self.sort_keys);
        positions
    }

    /// Rows passing the active filter, sorted, as copies.
    #[must_use]
    pub fn filtered_records(&self) -> Vec<Record> {
        self.view()
            .into_iter()
            .map(|pos| self.records[pos].clone())
            .collect()
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    fn page_bounds(&self, page: usize, len: usize) -> (usize, usize) {
        let start = page.saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        (start, end)
    }

    pub(crate) fn page_positions(&self, page: usize) -> Vec<usize> {
        let view = self.view();
        let (start, end) = self.page_bounds(page, view.len());
        view[start..end].to_vec()
    }

    /// Returns copies of the rows on a page of the filtered, sorted view.
    ///
    /// With `Some(page)` the cursor moves to that page first; with `None`
    /// the current cursor is used. Pages past the end are empty.
    pub fn get_page(&mut self, page: Option<usize>) -> Vec<Record> {
        if let Some(page) = page {
            self.page = page;
        }
        self.page_positions(self.page)
            .into_iter()
            .map(|pos| self.records[pos].clone())
            .collect()
    }

    /// Advances the cursor if there is a next page and returns the page.
    pub fn next_page(&mut self) -> Vec<Record> {
        if self.has_next_page() {
            self.page += 1;
        }
        self.get_page(None)
    }

    /// Moves the cursor back (not below 0) and returns the page.
    pub fn prev_page(&mut self) -> Vec<Record> {
        self.page = self.page.saturating_sub(1);
        self.get_page(None)
    }

    /// True iff `(cursor + 1) * page_size < total_count()`.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.page
            .saturating_add(1)
            .saturating_mul(self.page_size)
            < self.total_count()
    }

    /// True iff the cursor is past the first page.
    #[must_use]
    pub fn has_prev_page(&self) -> bool {
        self.page > 0
    }

    /// Number of rows passing the active filter.
    #[must_use]
    pub fn total_count(&self) -> usize {
        match &self.filter {
            Some(filter) => self.records.iter().filter(|r| filter.matches(r)).count(),
            None => self.records.len(),
        }
    }

    /// Number of pages in the filtered view.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.total_count().div_ceil(self.page_size)
    }

    /// Current page cursor (zero-based).
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Changes the page size and returns to the first page.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for a zero page size.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(Error::InvalidArgument(
                "page_size must be positive".to_string(),
            ));
        }
        self.page_size = page_size;
        self.page = 0;
        Ok(())
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Total number of rows, ignoring the filter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names in first-seen order.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.columns.iter().cloned().collect()
    }

    /// All rows in insertion order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn extend_columns<'a>(&mut self, keys: impl Iterator<Item = &'a String>) {
        for key in keys {
            if !self.columns.contains(key) {
                self.columns.insert(key.clone());
            }
        }
    }
}

/// Lowest positive id for which `taken` is false.
pub(crate) fn smallest_free_id(taken: impl Fn(i64) -> bool) -> i64 {
    (1..=MAX_ID).find(|&id| !taken(id)).unwrap_or(MAX_ID)
}

fn assign_id(record: &mut Record, id: i64) {
    if record.contains_key(ID_COLUMN) {
        record.insert(ID_COLUMN.to_string(), Value::from(id));
    } else {
        record.shift_insert(0, ID_COLUMN.to_string(), Value::from(id));
    }
}

/// Reads a selection flag. Text sources carry "0"/"1"/"true"/"false".
pub(crate) fn flag_value(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes")
        }
        other => is_truthy(other),
    }
}

pub(crate) fn normalize_selected(record: &mut Record) {
    let selected = record.get(SELECTED_COLUMN).is_some_and(flag_value);
    record.insert(SELECTED_COLUMN.to_string(), Value::from(i64::from(selected)));
}

pub(crate) fn is_selected(record: &Record) -> bool {
    record.get(SELECTED_COLUMN).is_some_and(flag_value)
}
