//! Parsed filter and sort expressions.

use serde_json::Value;
use std::fmt;

use super::like::LikePattern;

/// Boolean connective between two filter terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// Both sides must hold.
    And,
    /// Either side must hold.
    Or,
}

/// Operator applied to a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `column = literal`
    Eq(Value),
    /// `column != literal`
    Neq(Value),
    /// `column > literal`
    Gt(Value),
    /// `column >= literal`
    Gte(Value),
    /// `column < literal`
    Lt(Value),
    /// `column <= literal`
    Lte(Value),
    /// Case-insensitive substring test.
    Contains(Value),
    /// Case-insensitive prefix test.
    StartsWith(Value),
    /// Case-insensitive suffix test.
    EndsWith(Value),
    /// Membership in a literal list.
    In(Vec<Value>),
    /// Anchored, case-insensitive `%`/`_` pattern.
    Like(LikePattern),
    /// Bare column: true when the value is truthy.
    Truthy,
}

/// A single `(column, operator, value)` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    /// Column the term reads. Missing columns read as null.
    pub column: String,
    /// Operator and its literal operand(s).
    pub op: Op,
}

/// A compiled filter: terms folded strictly left to right.
///
/// `a OR b AND c` means `(a OR b) AND c`; there is no operator precedence
/// and no grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    pub(crate) first: Term,
    pub(crate) rest: Vec<(Connective, Term)>,
}

impl FilterExpr {
    /// Creates a filter from a single term.
    #[must_use]
    pub fn new(first: Term) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    /// Appends a term joined with the given connective.
    #[must_use]
    pub fn then(mut self, connective: Connective, term: Term) -> Self {
        self.rest.push((connective, term));
        self
    }

    /// Iterates over all terms in evaluation order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, t)| t))
    }

    /// Columns referenced by the filter, in order of first appearance.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for term in self.terms() {
            if !seen.contains(&term.column.as_str()) {
                seen.push(&term.column);
            }
        }
        seen
    }
}

/// One `column [ASC|DESC]` clause of a sort expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Column to sort on.
    pub column: String,
    /// True for `DESC`.
    pub descending: bool,
}

impl SortKey {
    /// Ascending key.
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Descending key.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

// =============================================================================
// Display: canonical expression text
// =============================================================================

fn write_column(f: &mut fmt::Formatter<'_>, column: &str) -> fmt::Result {
    let regular = column
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && column
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    if regular {
        f.write_str(column)
    } else {
        write!(f, "`{column}`")
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) if s.contains('\'') => write!(f, "\"{s}\""),
        Value::String(s) => write!(f, "'{s}'"),
        other => write!(f, "{other}"),
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_column(f, &self.column)?;
        let (keyword, literal) = match &self.op {
            Op::Truthy => return Ok(()),
            Op::In(values) => {
                f.write_str(" IN (")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_literal(f, v)?;
                }
                return f.write_str(")");
            }
            Op::Like(pattern) => {
                f.write_str(" LIKE ")?;
                return write_literal(f, &Value::String(pattern.as_str().to_string()));
            }
            Op::Eq(v) => ("=", v),
            Op::Neq(v) => ("!=", v),
            Op::Gt(v) => (">", v),
            Op::Gte(v) => (">=", v),
            Op::Lt(v) => ("<", v),
            Op::Lte(v) => ("<=", v),
            Op::Contains(v) => ("CONTAINS", v),
            Op::StartsWith(v) => ("STARTSWITH", v),
            Op::EndsWith(v) => ("ENDSWITH", v),
        };
        write!(f, " {keyword} ")?;
        write_literal(f, literal)
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (connective, term) in &self.rest {
            write!(f, " {connective} {term}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_column(f, &self.column)?;
        if self.descending {
            f.write_str(" DESC")
        } else {
            f.write_str(" ASC")
        }
    }
}
