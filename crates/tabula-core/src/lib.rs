//! # Tabula Core
//!
//! In-memory tabular data engine: a row store with CRUD, pagination and
//! selection, driven by a small filter/sort expression language.
//!
//! ## Features
//!
//! - **Filter expressions**: `=`, `!=`, `<`, `<=`, `>`, `>=`, `CONTAINS`,
//!   `STARTSWITH`, `ENDSWITH`, `IN (...)`, `LIKE` and bare-column truthiness,
//!   chained with `AND` / `OR` strictly left to right
//! - **Multi-key sort**: `col1 DESC, col2` with nulls first
//! - **Row store**: stable ids, paging cursor, row selection, CSV export
//! - **Layered configuration**: defaults, `tabula.toml`, `TABULA_*` env vars
//!
//! ## Quick Start
//!
//! ```rust
//! use tabula_core::RowStore;
//! use serde_json::json;
//!
//! let mut store = RowStore::with_page_size(2);
//! store.set_data(vec![
//!     json!({"name": "Alice", "age": 30}),
//!     json!({"name": "Bob", "age": 25}),
//!     json!({"name": "Carol", "age": 35}),
//! ]);
//!
//! store.set_filter("age >= 30").unwrap();
//! store.set_sort("age DESC").unwrap();
//!
//! let page = store.get_page(None);
//! assert_eq!(page[0]["name"], json!("Carol"));
//! assert_eq!(store.total_count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// Row ids and float comparisons convert between i64/f64 in a few places.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
// =============================================================================
// STYLISTIC LINTS - Safe to allow globally (no bug risk)
// =============================================================================
#![allow(clippy::option_if_let_else)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::float_cmp)]

pub mod config;
pub mod error;
#[cfg(test)]
mod error_tests;
pub mod query;
pub mod store;
pub mod value;

pub use config::{ConfigError, LoggingConfig, StoreConfig, TabulaConfig, DEFAULT_PAGE_SIZE};
pub use error::{Error, Result};
pub use query::{
    parse_sort, Connective, EvalError, FilterExpr, LikePattern, Op, ParseError, ParseErrorKind,
    SortKey, Term,
};
pub use store::{DataSource, RowStore, SelectionScope};
pub use value::{Record, ID_COLUMN, MAX_ID, SELECTED_COLUMN, TEXT_COLUMN};
