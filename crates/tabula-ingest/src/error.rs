//! Error types for tabula-ingest.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion errors.
///
/// Error codes follow the pattern `ING-XXX`. Per-field cast and transform
/// failures are not errors; they are collected in
/// [`LoadReport::field_errors`](crate::LoadReport::field_errors).
#[derive(Error, Debug)]
pub enum Error {
    /// Source path does not exist (ING-001).
    #[error("[ING-001] File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error (ING-002).
    #[error("[ING-002] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse error (ING-003).
    #[error("[ING-003] CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parse error (ING-004).
    #[error("[ING-004] JSON error: {0}")]
    Json(String),

    /// Unsupported or undecodable text encoding (ING-005).
    #[error("[ING-005] Encoding error: {0}")]
    Encoding(String),

    /// Invalid load options (ING-006).
    #[error("[ING-006] Configuration error: {0}")]
    Config(String),

    /// Error raised by the row store (ING-007).
    #[error("[ING-007] {0}")]
    Core(#[from] tabula_core::Error),

    /// Background load could not run or finish (ING-008).
    #[error("[ING-008] Background load failed: {0}")]
    Worker(String),
}

impl Error {
    /// Returns the error code (e.g., "ING-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ING-001",
            Self::Io(_) => "ING-002",
            Self::Csv(_) => "ING-003",
            Self::Json(_) => "ING-004",
            Self::Encoding(_) => "ING-005",
            Self::Config(_) => "ING-006",
            Self::Core(_) => "ING-007",
            Self::Worker(_) => "ING-008",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}
