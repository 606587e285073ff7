use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across admission, CSV and Excel parsing, and consolidation.
/// Most variants are file-scoped and never escape [`crate::ingestion::consolidate`]: they are turned
/// into [`crate::types::ProcessingNotice`]s there.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook could not be opened or a sheet could not be decoded.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid glob pattern passed to a source loader.
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory traversal error from a source loader.
    #[error("directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// No (encoding, delimiter) combination produced a header row.
    #[error("no usable encoding/delimiter combination found for '{file}'")]
    NoValidDialect { file: String },

    /// The file extension is not one of the supported source families.
    #[error("unsupported source type for '{file}'")]
    UnsupportedSource { file: String },

    /// The source is structurally valid but holds no data rows.
    #[error("no data in '{file}': {message}")]
    EmptySource { file: String, message: String },

    /// A parser panicked on this source; the panic was contained to the file.
    #[error("parser crashed on '{file}': {message}")]
    ParserPanic { file: String, message: String },

    /// The pipeline was invoked without any admitted files.
    #[error("no files were provided for consolidation")]
    EmptyBatch,
}
