//! Load options for file ingestion.
//!
//! Options that are plain data live here and can come from the `[load]`
//! section of `tabula.toml` or from `TABULA_LOAD__*` environment variables.
//! Options that are code (casters, transforms, callbacks) live in
//! [`Hooks`](crate::Hooks).
//!
//! ```toml
//! [load]
//! file_format = "csv"
//! encoding = "utf-8-sig"
//! skip_rows = 2
//! loading_strategy = "chunked"
//! chunk_size = 500
//!
//! [load.column_renames]
//! "Full Name" = "name"
//!
//! [load.column_types]
//! age = "int"
//! ```

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tabula_core::{FilterExpr, TabulaConfig};

use crate::error::{Error, Result};
use crate::readers::Encoding;
use crate::types::ColumnType;

/// Source file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Infer from the file extension.
    #[default]
    Auto,
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// A JSON document.
    Json,
    /// One JSON value per line (JSON Lines / NDJSON).
    Jsonl,
}

impl FileFormat {
    /// Infers the format from a path's extension. Unknown extensions read as CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("tsv" | "tab") => Self::Tsv,
            Some("json") => Self::Json,
            Some("jsonl" | "ndjson") => Self::Jsonl,
            Some("csv") => Self::Csv,
            other => {
                tracing::debug!(extension = ?other, "unknown extension, reading as CSV");
                Self::Csv
            }
        }
    }

    /// Resolves `Auto` against the path and applies the `json_lines` switch.
    ///
    /// The result is never `Auto`.
    #[must_use]
    pub fn resolve(self, path: &Path, json_lines: bool) -> Self {
        let format = match self {
            Self::Auto => Self::from_path(path),
            other => other,
        };
        if json_lines && format == Self::Json {
            Self::Jsonl
        } else {
            format
        }
    }

    /// Lowercase name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        }
    }

    /// True for the delimited text formats.
    #[must_use]
    pub const fn is_delimited(self) -> bool {
        matches!(self, Self::Csv | Self::Tsv)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            other => Err(Error::Config(format!("unknown file format '{other}'"))),
        }
    }
}

/// How a file is read into the row store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingStrategy {
    /// Pick from the estimated row count.
    #[default]
    Auto,
    /// Read everything, then replace the store contents once.
    Eager,
    /// Reserved for on-demand loading; currently runs eagerly.
    Lazy,
    /// Read fixed-size chunks, appending each to the store.
    Chunked,
    /// Reserved for windowed loading of very large files; currently runs eagerly.
    Hybrid,
}

impl LoadingStrategy {
    /// Lowercase name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Eager => "eager",
            Self::Lazy => "lazy",
            Self::Chunked => "chunked",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for LoadingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "eager" => Ok(Self::Eager),
            "lazy" => Ok(Self::Lazy),
            "chunked" => Ok(Self::Chunked),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(Error::Config(format!("unknown loading strategy '{other}'"))),
        }
    }
}

/// Shape of a non-lines JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonOrient {
    /// Array of records, a `{"records": [...]}` container, an object of
    /// records, or a single record.
    #[default]
    Records,
    /// Object mapping each column to an array of values.
    Columns,
}

/// Ingestion options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Source format (`auto` infers from the extension).
    pub file_format: FileFormat,
    /// Text encoding: `utf-8`, `utf-8-sig` or `latin-1`.
    pub encoding: String,
    /// Field delimiter; defaults to tab for TSV and comma otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    /// Quote character for delimited formats.
    pub quotechar: char,
    /// Physical lines skipped before anything is parsed.
    pub skip_rows: usize,
    /// Index of the header line among the lines left after `skip_rows`.
    pub header_row: usize,
    /// Whether delimited files carry a header; without one columns are
    /// named `col_0`, `col_1`, ...
    pub has_header: bool,
    /// Parse delimited fields into numbers, booleans and null (empty field)
    /// instead of keeping every field as text.
    pub infer_types: bool,
    /// Treat a `.json` file as JSON Lines.
    pub json_lines: bool,
    /// Layout of a JSON document.
    pub json_orient: JsonOrient,
    /// Column renames, old name to new name.
    pub column_renames: IndexMap<String, String>,
    /// Named casters per column (after renames).
    pub column_types: IndexMap<String, ColumnType>,
    /// Allow-list of source columns; empty keeps every column.
    pub columns_to_load: Vec<String>,
    /// Fallback values for missing or null columns (after renames).
    pub default_values: IndexMap<String, Value>,
    /// Filter expression over raw source records; rows that do not match are
    /// dropped before any other step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_filter: Option<String>,
    /// Loading strategy.
    pub loading_strategy: LoadingStrategy,
    /// Rows per chunk for chunked loading.
    pub chunk_size: usize,
    /// Row count above which `auto` stops choosing eager loading.
    pub max_memory_rows: usize,
    /// Load on a background thread.
    pub use_threading: bool,
}

/// Default rows per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default eager-loading threshold.
pub const DEFAULT_MAX_MEMORY_ROWS: usize = 100_000;

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            file_format: FileFormat::Auto,
            encoding: "utf-8".to_string(),
            delimiter: None,
            quotechar: '"',
            skip_rows: 0,
            header_row: 0,
            has_header: true,
            infer_types: false,
            json_lines: false,
            json_orient: JsonOrient::Records,
            column_renames: IndexMap::new(),
            column_types: IndexMap::new(),
            columns_to_load: Vec::new(),
            default_values: IndexMap::new(),
            row_filter: None,
            loading_strategy: LoadingStrategy::Auto,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_memory_rows: DEFAULT_MAX_MEMORY_ROWS,
            use_threading: false,
        }
    }
}

impl LoadOptions {
    /// Loads the `[load]` section from a configuration file and the
    /// environment (`TABULA_LOAD__CHUNK_SIZE=500`), over defaults.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a value has the wrong shape.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_over(path, Self::default())
    }

    /// Like [`load_from_path`](Self::load_from_path), with `base` in place of
    /// the built-in defaults. File and environment values still win.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a value has the wrong shape.
    pub fn load_over<P: AsRef<Path>>(path: P, base: Self) -> Result<Self> {
        Ok(TabulaConfig::figment(path)
            .join(Serialized::default("load", base))
            .extract_inner("load")?)
    }

    /// Parses options from TOML text containing a `[load]` table.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(Figment::new()
            .merge(Serialized::default("load", Self::default()))
            .merge(Toml::string(toml_str))
            .extract_inner("load")?)
    }

    /// Serializes the options as a `[load]` TOML table.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a value cannot be represented in TOML
    /// (for example a null default value).
    pub fn to_toml(&self) -> Result<String> {
        let mut root = IndexMap::new();
        root.insert("load", self);
        toml::to_string_pretty(&root).map_err(|e| Error::Config(e.to_string()))
    }

    /// Checks option values.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first invalid option.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be >= 1".to_string()));
        }
        if self.max_memory_rows == 0 {
            return Err(Error::Config("max_memory_rows must be >= 1".to_string()));
        }
        Encoding::parse(&self.encoding)?;
        if let Some(delimiter) = self.delimiter {
            ascii_byte("delimiter", delimiter)?;
        }
        ascii_byte("quotechar", self.quotechar)?;
        if let Some((old, _)) = self.column_renames.iter().find(|(_, new)| new.is_empty()) {
            return Err(Error::Config(format!(
                "column_renames: '{old}' is renamed to an empty name"
            )));
        }
        if let Some(expr) = &self.row_filter {
            FilterExpr::parse(expr)
                .map_err(|e| Error::Config(format!("row_filter: {e}")))?;
        }
        Ok(())
    }

    /// Delimiter byte for a delimited format.
    #[must_use]
    pub fn delimiter_for(&self, format: FileFormat) -> u8 {
        match self.delimiter {
            Some(c) if c.is_ascii() => c as u8,
            _ if format == FileFormat::Tsv => b'\t',
            _ => b',',
        }
    }

    /// Quote byte for delimited formats.
    #[must_use]
    pub fn quote_byte(&self) -> u8 {
        if self.quotechar.is_ascii() {
            self.quotechar as u8
        } else {
            b'"'
        }
    }
}

fn ascii_byte(name: &str, c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(Error::Config(format!(
            "{name} must be a single ASCII character, got '{c}'"
        )))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
