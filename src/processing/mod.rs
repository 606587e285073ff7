//! In-memory consolidation steps.
//!
//! The processing layer turns the untyped [`crate::types::ParseResult`]s produced by ingestion
//! into one typed [`crate::types::DataSet`]:
//!
//! - [`unify()`]: column-union schema unification
//! - [`infer_schema()`] / [`apply_schema()`]: sample-based type inference, then conversion
//!
//! ## Example: unify → infer → convert
//!
//! ```rust
//! use rust_data_consolidation::processing::{apply_schema, infer_schema, unify};
//! use rust_data_consolidation::types::{DataType, ParseResult, Value};
//!
//! let a = ParseResult::new(
//!     "a.csv",
//!     vec!["id".to_string(), "active".to_string()],
//!     vec![vec![Some("007".to_string()), Some("Yes".to_string())]],
//! );
//! let b = ParseResult::new(
//!     "b.csv",
//!     vec!["id".to_string(), "note".to_string()],
//!     vec![vec![Some("42".to_string()), Some("hello".to_string())]],
//! );
//!
//! let table = unify(&[a, b]);
//! assert_eq!(table.headers, vec!["id", "active", "note"]);
//!
//! let schema = infer_schema(&table, 500);
//! assert_eq!(schema.data_type_of("id"), Some(DataType::Int64));
//! assert_eq!(schema.data_type_of("active"), Some(DataType::Bool));
//!
//! let ds = apply_schema(&schema, table);
//! assert_eq!(ds.rows[0], vec![Value::Int64(7), Value::Bool(true), Value::Null]);
//! assert_eq!(ds.rows[1], vec![Value::Int64(42), Value::Null, Value::Utf8("hello".to_string())]);
//! ```

pub mod infer;
pub mod unify;

pub use infer::{
    apply_schema, convert_cell, infer_and_convert, infer_column_type, infer_schema, DEFAULT_SAMPLE_ROWS,
};
pub use unify::{unify, unify_headers, unique_headers};
