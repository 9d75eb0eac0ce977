//! Multi-key record ordering.
//!
//! Null and missing values sort first under both `ASC` and `DESC`: the
//! direction only reverses the ordering of non-null values. Existing callers
//! rely on this, so it is kept as-is.

use serde_json::Value;
use std::cmp::Ordering;

use super::ast::SortKey;
use crate::value::{sort_cmp, Record};

fn sort_value<'a>(record: &'a Record, column: &str) -> Option<&'a Value> {
    record.get(column).filter(|v| !v.is_null())
}

/// Compares two records by a list of sort keys, first key dominant.
#[must_use]
pub fn compare_by_keys(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ord = match (sort_value(a, &key.column), sort_value(b, &key.column)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(va), Some(vb)) => {
                let ord = sort_cmp(va, vb);
                if key.descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Stable in-place sort of records by the given keys.
///
/// Equivalent to one stable pass per key from the last key to the first.
pub fn sort_records(records: &mut [Record], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare_by_keys(a, b, keys));
}

/// Stable sort of positions into `records` by the given keys.
pub(crate) fn sort_positions(positions: &mut [usize], records: &[Record], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    positions.sort_by(|&a, &b| compare_by_keys(&records[a], &records[b], keys));
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod tests;
