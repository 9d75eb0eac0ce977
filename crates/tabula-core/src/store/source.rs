//! Paged data source abstraction.

use super::RowStore;
use crate::error::Result;
use crate::value::Record;

/// Anything a paged table view can drive.
///
/// Implemented by [`RowStore`] directly and by loaders that wrap a shared
/// store.
pub trait DataSource {
    /// Rows of a page; `Some(page)` also moves the cursor.
    fn get_page(&mut self, page: Option<usize>) -> Vec<Record>;

    /// Advances the cursor if possible and returns the page.
    fn next_page(&mut self) -> Vec<Record>;

    /// Moves the cursor back if possible and returns the page.
    fn prev_page(&mut self) -> Vec<Record>;

    /// Whether another page follows the cursor.
    fn has_next_page(&self) -> bool;

    /// Rows passing the active filter.
    fn total_count(&self) -> usize;

    /// Column names in first-seen order.
    fn columns(&self) -> Vec<String>;

    /// Compiles and activates a filter expression.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed expressions.
    fn set_filter(&mut self, expr: &str) -> Result<()>;

    /// Compiles and activates a sort expression.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed expressions.
    fn set_sort(&mut self, expr: &str) -> Result<()>;

    /// Selects rows in scope, returning the number changed.
    fn select_all(&mut self, current_page_only: bool) -> usize;

    /// Unselects rows in scope, returning the number changed.
    fn unselect_all(&mut self, current_page_only: bool) -> usize;

    /// Selected rows across the whole source.
    fn selected_count(&self) -> usize;
}

impl DataSource for RowStore {
    fn get_page(&mut self, page: Option<usize>) -> Vec<Record> {
        RowStore::get_page(self, page)
    }

    fn next_page(&mut self) -> Vec<Record> {
        RowStore::next_page(self)
    }

    fn prev_page(&mut self) -> Vec<Record> {
        RowStore::prev_page(self)
    }

    fn has_next_page(&self) -> bool {
        RowStore::has_next_page(self)
    }

    fn total_count(&self) -> usize {
        RowStore::total_count(self)
    }

    fn columns(&self) -> Vec<String> {
        RowStore::columns(self)
    }

    fn set_filter(&mut self, expr: &str) -> Result<()> {
        RowStore::set_filter(self, expr)
    }

    fn set_sort(&mut self, expr: &str) -> Result<()> {
        RowStore::set_sort(self, expr)
    }

    fn select_all(&mut self, current_page_only: bool) -> usize {
        RowStore::select_all(self, current_page_only)
    }

    fn unselect_all(&mut self, current_page_only: bool) -> usize {
        RowStore::unselect_all(self, current_page_only)
    }

    fn selected_count(&self) -> usize {
        RowStore::selected_count(self)
    }
}
