//! Error types for `tabula`.
//!
//! Not-found conditions on the row store are not errors: lookups by id
//! return `None`/`false`. The variants here cover the places where failures
//! do surface to the caller, namely malformed expressions, bad arguments and
//! export I/O.

use thiserror::Error;

use crate::query::ParseError;

/// Result type alias for `tabula` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `tabula` operations.
///
/// Error codes follow the pattern `TAB-XXX`.
#[derive(Error, Debug)]
pub enum Error {
    /// Filter or sort expression could not be parsed (TAB-001).
    #[error("[TAB-001] Expression error: {0}")]
    Parse(#[from] ParseError),

    /// Invalid argument passed to a store operation (TAB-002).
    #[error("[TAB-002] Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error (TAB-003).
    #[error("[TAB-003] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error (TAB-004).
    #[error("[TAB-004] CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error (TAB-005).
    #[error("[TAB-005] Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (TAB-006).
    #[error("[TAB-006] Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the error code (e.g., "TAB-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "TAB-001",
            Self::InvalidArgument(_) => "TAB-002",
            Self::Io(_) => "TAB-003",
            Self::Csv(_) => "TAB-004",
            Self::Serialization(_) => "TAB-005",
            Self::Config(_) => "TAB-006",
        }
    }

    /// Returns true if the error was caused by caller input rather than the
    /// environment (bad expression or argument).
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::InvalidArgument(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
