//! # Tabula Ingest
//!
//! Loads CSV, TSV, JSON and JSON Lines files into a
//! [`RowStore`](tabula_core::RowStore), running every record through a
//! fixed transformation pipeline.
//!
//! ## Supported Formats
//!
//! | Format | Extensions | Notes |
//! |--------|------------|-------|
//! | CSV | `.csv` (and unknown) | `csv` crate, configurable delimiter/quote |
//! | TSV | `.tsv`, `.tab` | tab delimiter by default |
//! | JSON | `.json` | array, `{"records": [...]}`, object of records, columns |
//! | JSON Lines | `.jsonl`, `.ndjson` | one value per non-blank line |
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabula_ingest::{ColumnType, FileDataSource, Hooks, LoadOptions};
//!
//! let mut options = LoadOptions::default();
//! options.column_types.insert("age".into(), ColumnType::Int);
//! options.row_filter = Some("status != 'deleted'".into());
//!
//! let hooks = Hooks::new().on_progress(|done, total| eprintln!("{done}/{total}"));
//! let mut source = FileDataSource::new("people.csv", options, hooks)?;
//! source.load()?;
//!
//! let mut store = source.store();
//! store.set_sort("age DESC")?;
//! for row in store.get_page(None) {
//!     println!("{row:?}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration Example
//!
//! ```toml
//! [load]
//! encoding = "latin-1"
//! loading_strategy = "auto"
//! max_memory_rows = 100000
//!
//! [load.default_values]
//! country = "unknown"
//! ```

#![warn(missing_docs)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod pipeline;
pub mod readers;
pub mod source;
pub mod strategy;
pub mod types;

pub use config::{FileFormat, JsonOrient, LoadOptions, LoadingStrategy};
pub use error::{Error, Result};
pub use hooks::{HookError, Hooks};
pub use loader::load_into;
pub use pipeline::{FieldError, FieldStage, LoadReport, Pipeline};
pub use readers::{open_reader, Encoding, RecordReader};
pub use source::FileDataSource;
pub use strategy::{choose_strategy, estimate_row_count};
pub use types::ColumnType;
