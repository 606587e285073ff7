//! `rust-data-consolidation` ingests a batch of tabular files whose encoding, delimiter, sheet
//! layout and column types are unknown in advance, and consolidates them into one in-memory
//! [`types::DataSet`] with a unified header set and inferred column types.
//!
//! The primary entrypoint is [`ingestion::consolidate_batch`], which screens the batch, parses
//! every admitted file in order, and never aborts because a single file fails.
//!
//! ## What you can ingest
//!
//! - **Delimited text**: `.csv`, in strict UTF-8, windows-1252 or ISO-8859-15, delimited by `;`,
//!   `,`, tab or `|`. The combination that splits the header into the most columns wins.
//! - **Workbooks**: `.xls` and `.xlsx`. Every sheet with at least one data row becomes its own table.
//!
//! ## Output
//!
//! A [`ingestion::Consolidation`] holds:
//!
//! - `dataset`: headers (first-seen union across files), one inferred [`types::DataType`] per
//!   header, and rows with exactly one [`types::Value`] per header
//! - `notices`: one [`types::ProcessingNotice`] per file that failed or held no data
//! - `diagnostics`: malformed rows inside accepted text files (informational)
//! - `discarded`: files rejected at admission (unsupported extension, zero bytes)
//!
//! Column types are decided from the first 500 rows: [`types::DataType::Bool`],
//! [`types::DataType::Int64`], [`types::DataType::Float64`], falling back to
//! [`types::DataType::Utf8`]. Blank cells become [`types::Value::Null`].
//!
//! ## Quick example
//!
//! ```rust
//! use rust_data_consolidation::ingestion::{consolidate_batch, IngestionOptions};
//! use rust_data_consolidation::types::{DataType, SourceFile, Value};
//!
//! # fn main() -> Result<(), rust_data_consolidation::IngestionError> {
//! let files = vec![
//!     SourceFile::new("people.csv", "id;name;active\n007;Ada;Yes\n42;Grace;No\n"),
//!     SourceFile::new("more.csv", "id,city\n3,Oslo\n"),
//!     SourceFile::new("notes.txt", "ignored"),
//! ];
//!
//! let out = consolidate_batch(&files, &IngestionOptions::default())?;
//! assert_eq!(out.headers(), vec!["id", "name", "active", "city"]);
//! assert_eq!(out.dataset.schema.data_type_of("id"), Some(DataType::Int64));
//! assert_eq!(out.dataset.rows[0][0], Value::Int64(7));
//! assert_eq!(out.dataset.rows[2][2], Value::Null);
//! assert_eq!(out.discarded.len(), 1);
//! assert!(out.notices.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: admission, format readers, observers and the consolidation entrypoints
//! - [`processing`]: schema unification and type inference
//! - [`types`]: source, table and dataset types
//! - [`error`]: error types used across the crate

pub mod error;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{IngestionError, IngestionResult};
