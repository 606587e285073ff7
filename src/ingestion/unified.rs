//! Batch consolidation entrypoint.
//!
//! Most callers should use [`consolidate`] (already-admitted files) or [`consolidate_batch`]
//! (screens the batch first). Both process files strictly in input order:
//!
//! - each file is dispatched to the delimited text parser or the workbook extractor by extension
//! - any failure is turned into a [`ProcessingNotice`] and never aborts the batch
//! - the successful [`ParseResult`]s are unified into one header set and typed by sampling
//!
//! If an [`IngestionObserver`] is provided, progress and per-file outcomes are reported to it.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{IngestionError, IngestionResult};
use crate::processing::{infer_and_convert, unify, DEFAULT_SAMPLE_ROWS};
use crate::types::{DataSet, ParseResult, ProcessingNotice, RowDiagnostic, SourceFile, SourceKind};

use super::admission::{admit, Discard};
use super::csv::{ingest_csv_from_source, DialectCandidates};
use super::excel::ingest_excel_from_source;
use super::observability::{
    IngestionContext, IngestionObserver, IngestionProgress, IngestionSeverity, IngestionStats,
};

/// Options controlling consolidation.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Optional observer for progress, logging and alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
    /// Leading rows sampled per column for type inference.
    pub sample_rows: usize,
    /// Encodings and delimiters tried for delimited text.
    pub dialects: DialectCandidates,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("sample_rows", &self.sample_rows)
            .field("dialects", &self.dialects)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
            sample_rows: DEFAULT_SAMPLE_ROWS,
            dialects: DialectCandidates::default(),
        }
    }
}

/// Result of a consolidation run.
///
/// `discarded` (admission) and `notices` (processing) are separate channels: a discarded file was
/// never opened, a noticed file was opened and then skipped or failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Consolidation {
    /// Unified headers, inferred types and typed rows.
    pub dataset: DataSet,
    /// One entry per file that failed or held no data.
    pub notices: Vec<ProcessingNotice>,
    /// Malformed rows inside accepted text sources.
    pub diagnostics: Vec<RowDiagnostic>,
    /// Files rejected at admission (only filled by [`consolidate_batch`]).
    pub discarded: Vec<Discard>,
}

impl Consolidation {
    /// Unified header names.
    pub fn headers(&self) -> Vec<String> {
        self.dataset.headers()
    }

    /// `true` when no file contributed data ("no data could be consolidated").
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Render the whole result as JSON.
    pub fn to_json(&self) -> IngestionResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Sequential, single-owner accumulator for one run.
#[derive(Default)]
struct Accumulator {
    results: Vec<ParseResult>,
    notices: Vec<ProcessingNotice>,
    diagnostics: Vec<RowDiagnostic>,
}

impl Accumulator {
    fn accept(&mut self, results: Vec<ParseResult>) {
        for mut result in results {
            self.diagnostics.append(&mut result.diagnostics);
            self.results.push(result);
        }
    }

    fn reject(&mut self, file: &SourceFile, severity: IngestionSeverity, error: &IngestionError) {
        self.notices
            .push(ProcessingNotice::new(file.name.clone(), error.to_string(), severity));
    }

    fn finish(self, sample_rows: usize) -> Consolidation {
        let dataset = if self.results.is_empty() {
            tracing::warn!(notices = self.notices.len(), "no data could be consolidated");
            DataSet::default()
        } else {
            infer_and_convert(unify(&self.results), sample_rows)
        };
        Consolidation {
            dataset,
            notices: self.notices,
            diagnostics: self.diagnostics,
            discarded: Vec::new(),
        }
    }
}

/// Consolidate already-admitted files into one typed dataset.
///
/// Files are processed one at a time in input order. Before each file is parsed the observer's
/// `on_progress` is called with its 1-based position. Files that fail or hold no data become
/// notices; the run itself only fails with [`IngestionError::EmptyBatch`] when `files` is empty.
///
/// When every file fails, the returned [`Consolidation`] has no headers, no rows and one notice
/// per file.
///
/// # Examples
///
/// ```
/// use rust_data_consolidation::ingestion::{consolidate, IngestionOptions};
/// use rust_data_consolidation::types::{SourceFile, Value};
///
/// # fn main() -> Result<(), rust_data_consolidation::IngestionError> {
/// let files = vec![
///     SourceFile::new("a.csv", "a;b\n5;2\n"),
///     SourceFile::new("b.csv", "b,c\n3,4\n"),
/// ];
/// let out = consolidate(&files, &IngestionOptions::default())?;
/// assert_eq!(out.headers(), vec!["a", "b", "c"]);
/// assert_eq!(out.dataset.rows[1], vec![Value::Null, Value::Int64(3), Value::Int64(4)]);
/// # Ok(())
/// # }
/// ```
pub fn consolidate<'a, I>(files: I, options: &IngestionOptions) -> IngestionResult<Consolidation>
where
    I: IntoIterator<Item = &'a SourceFile>,
{
    let files: Vec<&SourceFile> = files.into_iter().collect();
    if files.is_empty() {
        return Err(IngestionError::EmptyBatch);
    }

    let total = files.len();
    let mut acc = Accumulator::default();

    for (idx, file) in files.into_iter().enumerate() {
        if let Some(obs) = options.observer.as_ref() {
            obs.on_progress(&IngestionProgress {
                file_name: &file.name,
                position: idx + 1,
                total,
            });
        }

        let ctx = IngestionContext {
            file_name: file.name.clone(),
            kind: file.kind(),
        };

        match parse_source_contained(file, options) {
            Ok(results) => {
                if let Some(obs) = options.observer.as_ref() {
                    let stats = IngestionStats {
                        tables: results.len(),
                        rows: results.iter().map(ParseResult::row_count).sum(),
                    };
                    obs.on_success(&ctx, stats);
                }
                acc.accept(results);
            }
            Err(e) => {
                let sev = IngestionSeverity::for_error(&e);
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_failure(&ctx, sev, &e);
                    if sev >= options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, &e);
                    }
                }
                acc.reject(file, sev, &e);
            }
        }
    }

    Ok(acc.finish(options.sample_rows))
}

/// Screen `files` by extension and size, then consolidate the admitted ones.
///
/// Fails with [`IngestionError::EmptyBatch`] only when `files` is empty. A non-empty batch whose
/// files are all discarded at admission is not a caller error: it yields an empty
/// [`Consolidation`] (no headers, no rows, no notices) whose `discarded` list explains every
/// file. Calling [`consolidate`] directly with zero admitted files is still `EmptyBatch`.
pub fn consolidate_batch(
    files: &[SourceFile],
    options: &IngestionOptions,
) -> IngestionResult<Consolidation> {
    if files.is_empty() {
        return Err(IngestionError::EmptyBatch);
    }

    let admission = admit(files);
    let mut out = if admission.is_empty() {
        Consolidation::default()
    } else {
        consolidate(admission.admitted.iter().copied(), options)?
    };
    out.discarded = admission.discarded;
    Ok(out)
}

/// Dispatch one file by kind.
pub fn parse_source(file: &SourceFile, options: &IngestionOptions) -> IngestionResult<Vec<ParseResult>> {
    match file.kind() {
        Some(SourceKind::DelimitedText) => {
            ingest_csv_from_source(file, &options.dialects).map(|result| vec![result])
        }
        Some(SourceKind::LegacySpreadsheet | SourceKind::ModernSpreadsheet) => {
            ingest_excel_from_source(file)
        }
        None => Err(IngestionError::UnsupportedSource {
            file: file.name.clone(),
        }),
    }
}

/// [`parse_source`], with a parser panic converted into [`IngestionError::ParserPanic`].
fn parse_source_contained(
    file: &SourceFile,
    options: &IngestionOptions,
) -> IngestionResult<Vec<ParseResult>> {
    panic::catch_unwind(AssertUnwindSafe(|| parse_source(file, options))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(IngestionError::ParserPanic {
            file: file.name.clone(),
            message,
        })
    })
}

/// Owned request object, for callers that queue consolidation work.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Input files, in processing order.
    pub files: Vec<SourceFile>,
    /// Options controlling consolidation.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("files", &self.files.len())
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    /// Execute the request by calling [`consolidate_batch`].
    pub fn run(&self) -> IngestionResult<Consolidation> {
        consolidate_batch(&self.files, &self.options)
    }
}
