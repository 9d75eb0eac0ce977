//! Primitive values and records.
//!
//! A [`Record`] is an insertion-ordered mapping from column name to a JSON
//! scalar. Keeping insertion order means the column set inferred from the
//! first record (and anything exported from it) is deterministic.

use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// One row of data.
pub type Record = IndexMap<String, Value>;

/// Reserved column holding the record identifier.
pub const ID_COLUMN: &str = "id";

/// Reserved column holding the selection flag (`0` or `1`).
pub const SELECTED_COLUMN: &str = "selected";

/// Column used when a non-object value is wrapped into a record.
pub const TEXT_COLUMN: &str = "text";

/// Converts an arbitrary JSON value into a record.
///
/// Objects keep their fields in order; anything else becomes
/// `{"text": <display string>}`.
#[must_use]
pub fn record_from_value(value: Value) -> Record {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        other => {
            let mut record = Record::new();
            record.insert(
                TEXT_COLUMN.to_string(),
                Value::String(to_display_string(&other)),
            );
            record
        }
    }
}

/// Converts a record back into a JSON object.
#[must_use]
pub fn record_to_value(record: &Record) -> Value {
    Value::Object(
        record
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

/// Largest usable row id (2^53, the largest integer every JSON reader
/// represents exactly).
pub const MAX_ID: i64 = 1 << 53;

/// Reads a positive integer id from a value.
///
/// Integral numbers and strings holding an integer are accepted, so ids read
/// from text formats such as CSV resolve to the same key as numeric ids.
/// Ids above [`MAX_ID`] are not usable.
#[must_use]
pub fn as_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_ID as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (1..=MAX_ID).contains(&id).then_some(id)
}

/// Truthiness of a value: null, `false`, zero and the empty string are false.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Renders a value the way it appears in text output (CSV cells, substring
/// tests). Null renders as the empty string, strings are unquoted.
#[must_use]
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Equality used by `=`, `!=` and `IN`.
///
/// Numbers compare numerically (`1 == 1.0`). Values of different kinds are
/// never equal; in particular a boolean never equals a number.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64().zip(b.as_f64()).is_some_and(|(a, b)| a == b),
        },
        _ => a == b,
    }
}

/// Ordering used by `>`, `>=`, `<`, `<=`.
///
/// Returns `None` when the two values are not comparable (different kinds,
/// or composite values).
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (a.as_i64(), b.as_i64()) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Total ordering over non-null values for sorting.
///
/// Type priority: Bool < Number < String < Array < Object, so mixed columns
/// still sort deterministically. Null handling is the caller's concern.
#[must_use]
pub fn sort_cmp(a: &Value, b: &Value) -> Ordering {
    let type_rank = |v: &Value| -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    };

    let (rank_a, rank_b) = (type_rank(a), type_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Value::Number(na), Value::Number(nb)) => compare_numbers(na, nb).unwrap_or_else(|| {
            let fa = na.as_f64().unwrap_or(0.0);
            let fb = nb.as_f64().unwrap_or(0.0);
            fa.total_cmp(&fb)
        }),
        (Value::String(sa), Value::String(sb)) => sa.cmp(sb),
        (Value::Bool(ba), Value::Bool(bb)) => ba.cmp(bb),
        // Composite values are treated as equal; the stable sort keeps their order.
        _ => Ordering::Equal,
    }
}

/// Coerces a raw literal token into a value.
///
/// - `'x'` / `"x"` → string with the quotes stripped
/// - `true` / `false` (any case) → boolean
/// - `null` (any case) → null
/// - otherwise an integer, then a finite float, else the bare text
#[must_use]
pub fn parse_literal(raw: &str) -> Value {
    let raw = raw.trim();
    if let Some(inner) = strip_quotes(raw) {
        return Value::String(inner.to_string());
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

fn strip_quotes(raw: &str) -> Option<&str> {
    if raw.len() < 2 {
        return None;
    }
    let first = raw.chars().next()?;
    if (first == '\'' || first == '"') && raw.ends_with(first) {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
