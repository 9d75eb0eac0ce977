//! Filter and sort mini-language.
//!
//! Filters are WHERE-like strings compiled into a [`FilterExpr`]; sort
//! strings are ORDER-BY-like and compile into a list of [`SortKey`]s.
//!
//! ## Usage
//!
//! ```rust
//! use tabula_core::query::{parse_sort, FilterExpr};
//! use tabula_core::value::record_from_value;
//! use serde_json::json;
//!
//! let filter = FilterExpr::parse("name CONTAINS 'o' OR age >= 30").unwrap().unwrap();
//! let row = record_from_value(json!({"name": "Bob", "age": 25}));
//! assert!(filter.matches(&row));
//!
//! let keys = parse_sort("age DESC, name").unwrap();
//! assert_eq!(keys.len(), 2);
//! ```
//!
//! ## Grammar
//!
//! ```text
//! filter  := term (("AND"|"OR") term)*
//! term    := IDENT "IN" "(" literal, ... ")"
//!          | IDENT "LIKE" literal
//!          | IDENT ("CONTAINS"|"STARTSWITH"|"ENDSWITH") literal
//!          | IDENT ("="|"!="|">="|">"|"<="|"<") literal
//!          | IDENT
//! literal := quoted string | number | true | false | null | bare word
//! sort    := IDENT [ASC|DESC] ("," IDENT [ASC|DESC])*
//! ```

mod ast;
mod error;
mod like;
mod matching;
mod parser;
mod sort;

pub use ast::{Connective, FilterExpr, Op, SortKey, Term};
pub use error::{EvalError, ParseError, ParseErrorKind};
pub use like::LikePattern;
pub use parser::parse_sort;
pub use sort::{compare_by_keys, sort_records};

pub(crate) use sort::sort_positions;
