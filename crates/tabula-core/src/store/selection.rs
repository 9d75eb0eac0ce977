//! Row selection flags.

use serde_json::Value;

use super::{is_selected, RowStore};
use crate::value::{as_id, Record, ID_COLUMN, SELECTED_COLUMN};

/// Which rows a bulk select/unselect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionScope {
    /// Every row passing the active filter.
    Filtered,
    /// Only rows on the current page of the filtered, sorted view.
    CurrentPage,
}

impl SelectionScope {
    /// Maps the `current_page_only` flag used by callers.
    #[must_use]
    pub fn from_current_page_only(current_page_only: bool) -> Self {
        if current_page_only {
            Self::CurrentPage
        } else {
            Self::Filtered
        }
    }
}

impl RowStore {
    fn set_flag(&mut self, id: i64, selected: bool) -> bool {
        let Some(&pos) = self.positions.get(&id) else {
            return false;
        };
        self.records[pos].insert(
            SELECTED_COLUMN.to_string(),
            Value::from(i64::from(selected)),
        );
        true
    }

    /// Marks a row selected. Returns false if the id is unknown.
    pub fn select_record(&mut self, id: i64) -> bool {
        self.set_flag(id, true)
    }

    /// Clears a row's selection. Returns false if the id is unknown.
    pub fn unselect_record(&mut self, id: i64) -> bool {
        self.set_flag(id, false)
    }

    fn scope_positions(&self, scope: SelectionScope) -> Vec<usize> {
        match scope {
            SelectionScope::Filtered => self.view(),
            SelectionScope::CurrentPage => self.page_positions(self.page),
        }
    }

    fn set_flags(&mut self, scope: SelectionScope, selected: bool) -> usize {
        let mut changed = 0;
        for pos in self.scope_positions(scope) {
            let record = &mut self.records[pos];
            if is_selected(record) != selected {
                record.insert(
                    SELECTED_COLUMN.to_string(),
                    Value::from(i64::from(selected)),
                );
                changed += 1;
            }
        }
        tracing::debug!(?scope, selected, changed, "bulk selection");
        changed
    }

    /// Selects every row in scope. Returns how many rows changed state.
    pub fn select_all(&mut self, current_page_only: bool) -> usize {
        self.set_flags(SelectionScope::from_current_page_only(current_page_only), true)
    }

    /// Unselects every row in scope. Returns how many rows changed state.
    pub fn unselect_all(&mut self, current_page_only: bool) -> usize {
        self.set_flags(SelectionScope::from_current_page_only(current_page_only), false)
    }

    /// Number of selected rows in the whole store, ignoring the filter.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.records.iter().filter(|r| is_selected(r)).count()
    }

    /// Selected rows of the filtered, sorted view.
    ///
    /// With `Some(page)` only that page of the selected rows is returned.
    /// The page cursor is not moved.
    #[must_use]
    pub fn get_selected(&self, page: Option<usize>) -> Vec<Record> {
        let selected = self
            .view()
            .into_iter()
            .filter(|&pos| is_selected(&self.records[pos]));

        match page {
            Some(page) => selected
                .skip(page.saturating_mul(self.page_size))
                .take(self.page_size)
                .map(|pos| self.records[pos].clone())
                .collect(),
            None => selected.map(|pos| self.records[pos].clone()).collect(),
        }
    }

    /// Ids of all selected rows in insertion order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<i64> {
        self.records
            .iter()
            .filter(|r| is_selected(r))
            .filter_map(|r| r.get(ID_COLUMN).and_then(as_id))
            .collect()
    }
}
