//! Filter evaluation against records.

use serde_json::Value;
use std::cmp::Ordering;

use super::ast::{Connective, FilterExpr, Op, Term};
use super::error::EvalError;
use crate::value::{compare_values, is_truthy, to_display_string, values_equal, Record};

static NULL: Value = Value::Null;

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn folded(value: &Value) -> String {
    to_display_string(value).to_lowercase()
}

impl Term {
    /// Evaluates the term against a record.
    ///
    /// # Errors
    ///
    /// Returns an `EvalError` when an ordering comparison is applied to
    /// values that cannot be ordered against each other (for example a
    /// string column compared with a number).
    pub fn evaluate(&self, record: &Record) -> Result<bool, EvalError> {
        let value = record.get(&self.column).unwrap_or(&NULL);
        match &self.op {
            Op::Eq(literal) => Ok(values_equal(value, literal)),
            Op::Neq(literal) => Ok(!values_equal(value, literal)),
            Op::Gt(literal) => self.ordered(value, literal, Ordering::is_gt),
            Op::Gte(literal) => self.ordered(value, literal, Ordering::is_ge),
            Op::Lt(literal) => self.ordered(value, literal, Ordering::is_lt),
            Op::Lte(literal) => self.ordered(value, literal, Ordering::is_le),
            Op::Contains(literal) => Ok(folded(value).contains(&folded(literal))),
            Op::StartsWith(literal) => Ok(folded(value).starts_with(&folded(literal))),
            Op::EndsWith(literal) => Ok(folded(value).ends_with(&folded(literal))),
            Op::In(values) => Ok(values.iter().any(|v| values_equal(value, v))),
            Op::Like(pattern) => Ok(pattern.matches(&to_display_string(value))),
            Op::Truthy => Ok(is_truthy(value)),
        }
    }

    /// Total variant of [`Term::evaluate`]: evaluation errors count as no match.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.evaluate(record).unwrap_or_else(|err| {
            tracing::trace!(%err, "filter term evaluation failed; treating as false");
            false
        })
    }

    fn ordered(
        &self,
        value: &Value,
        literal: &Value,
        accept: fn(Ordering) -> bool,
    ) -> Result<bool, EvalError> {
        // Null on either side never matches an ordering comparison.
        if value.is_null() || literal.is_null() {
            return Ok(false);
        }
        compare_values(value, literal).map(accept).ok_or_else(|| {
            EvalError::new(
                &self.column,
                format!("cannot order {} against {}", kind(value), kind(literal)),
            )
        })
    }
}

impl FilterExpr {
    /// Evaluates the filter, stopping at the first term that fails to evaluate.
    ///
    /// Terms are combined strictly left to right:
    /// `result = result AND/OR term_i`.
    ///
    /// # Errors
    ///
    /// Returns the first `EvalError` raised by a term that had to be
    /// evaluated.
    pub fn evaluate(&self, record: &Record) -> Result<bool, EvalError> {
        let mut result = self.first.evaluate(record)?;
        for (connective, term) in &self.rest {
            result = match connective {
                Connective::And => result && term.evaluate(record)?,
                Connective::Or => result || term.evaluate(record)?,
            };
        }
        Ok(result)
    }

    /// Returns `true` if the record passes the filter.
    ///
    /// Never fails: a term that cannot be evaluated counts as false and the
    /// fold continues with the remaining terms.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        let mut result = self.first.matches(record);
        for (connective, term) in &self.rest {
            result = match connective {
                Connective::And => result && term.matches(record),
                Connective::Or => result || term.matches(record),
            };
        }
        result
    }
}

#[cfg(test)]
#[path = "matching_tests.rs"]
mod tests;
