//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`consolidate_batch`] or [`consolidate`] (from [`unified`]) which:
//!
//! - screen files by extension and size ([`admission`])
//! - parse each file with the matching reader, strictly in input order
//! - unify and type the results into one [`crate::types::DataSet`]
//! - optionally report progress/success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`] (encoding and delimiter discovery)
//! - [`excel`] (one result per data-bearing sheet)
//!
//! [`sources`] loads batches of [`crate::types::SourceFile`]s from disk.

pub mod admission;
pub mod csv;
pub mod excel;
pub mod observability;
pub mod sources;
pub mod unified;

pub use admission::{admit, Admission, Discard, DiscardReason};
pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionProgress, IngestionSeverity,
    IngestionStats, TracingObserver,
};
pub use sources::{sources_from_dir, sources_from_glob};
pub use unified::{consolidate, consolidate_batch, Consolidation, IngestionOptions, IngestionRequest};
