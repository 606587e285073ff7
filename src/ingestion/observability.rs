use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::IngestionError;
use crate::types::SourceKind;

/// Severity classification used for notices, observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal, e.g. a source without data).
    Warning,
    /// Error-level event (the source could not be parsed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl IngestionSeverity {
    /// Severity of a file-scoped failure.
    pub fn for_error(e: &IngestionError) -> Self {
        match e {
            IngestionError::Io(_) | IngestionError::WalkDir(_) => Self::Critical,
            IngestionError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            IngestionError::EmptySource { .. } => Self::Warning,
            IngestionError::Excel(_)
            | IngestionError::Json(_)
            | IngestionError::Glob(_)
            | IngestionError::ParserPanic { .. }
            | IngestionError::NoValidDialect { .. }
            | IngestionError::UnsupportedSource { .. }
            | IngestionError::EmptyBatch => Self::Error,
        }
    }
}

/// Context about one file being consolidated.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// File name of the source.
    pub file_name: String,
    /// Source kind, when the extension is supported.
    pub kind: Option<SourceKind>,
}

/// Progress report, sent once per file before that file is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionProgress<'a> {
    pub file_name: &'a str,
    /// 1-based position within the batch.
    pub position: usize,
    pub total: usize,
}

/// Minimal stats reported when a file parses successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of parse results (1 for text, one per data-bearing sheet for workbooks).
    pub tables: usize,
    /// Number of rows across those results.
    pub rows: usize,
}

/// Observer interface for consolidation progress and per-file outcomes.
///
/// Implementors can drive progress bars, record metrics, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called before each file is parsed.
    fn on_progress(&self, _progress: &IngestionProgress<'_>) {}

    /// Called when a file yields at least one parse result.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a file is skipped or fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_progress(&self, progress: &IngestionProgress<'_>) {
        for o in &self.observers {
            o.on_progress(progress);
        }
    }

    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits consolidation events as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_progress(&self, progress: &IngestionProgress<'_>) {
        tracing::info!(
            file = progress.file_name,
            position = progress.position,
            total = progress.total,
            "processing file"
        );
    }

    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            file = %ctx.file_name,
            kind = ?ctx.kind,
            tables = stats.tables,
            rows = stats.rows,
            "file parsed"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::warn!(
            file = %ctx.file_name,
            kind = ?ctx.kind,
            ?severity,
            %error,
            "file skipped"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            file = %ctx.file_name,
            kind = ?ctx.kind,
            ?severity,
            %error,
            "ALERT: file skipped"
        );
    }
}
