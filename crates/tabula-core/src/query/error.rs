//! Error types for expression parsing and evaluation.

use std::fmt;

/// Error that occurred while parsing a filter or sort expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Kind of error.
    pub kind: ParseErrorKind,
    /// Byte position in the input where the error occurred.
    pub position: usize,
    /// The problematic input fragment.
    pub fragment: String,
    /// Human-readable message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(
        kind: ParseErrorKind,
        position: usize,
        fragment: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            position,
            fragment: fragment.into(),
            message: message.into(),
        }
    }

    /// Creates a syntax error.
    #[must_use]
    pub fn syntax(
        position: usize,
        fragment: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ParseErrorKind::SyntaxError, position, fragment, message)
    }

    /// Creates an invalid literal error.
    #[must_use]
    pub fn invalid_literal(position: usize, fragment: impl Into<String>) -> Self {
        let frag = fragment.into();
        Self::new(
            ParseErrorKind::InvalidLiteral,
            position,
            frag.clone(),
            format!("Invalid literal '{frag}'"),
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at position {}",
            self.kind.code(),
            self.message,
            self.position
        )
    }
}

impl std::error::Error for ParseError {}

/// Kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Syntax error (E001).
    SyntaxError,
    /// Literal could not be represented (E002).
    InvalidLiteral,
}

impl ParseErrorKind {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SyntaxError => "E001",
            Self::InvalidLiteral => "E002",
        }
    }
}

/// Error raised while evaluating a single filter term against a record.
///
/// These never escape [`FilterExpr::matches`](super::FilterExpr::matches);
/// they are available through [`FilterExpr::evaluate`](super::FilterExpr::evaluate)
/// for callers that want to know why a row was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    /// Column the failing term reads.
    pub column: String,
    /// What went wrong.
    pub message: String,
}

impl EvalError {
    pub(crate) fn new(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column '{}': {}", self.column, self.message)
    }
}

impl std::error::Error for EvalError {}
