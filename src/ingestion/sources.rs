//! Loading batches of [`SourceFile`]s from disk.
//!
//! Loaders do not screen anything; pass the result through [`super::admission::admit`] or
//! [`super::consolidate_batch`].

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{IngestionError, IngestionResult};
use crate::types::SourceFile;

/// Read every regular file under `dir`, sorted by file name within each directory.
///
/// Only the top level is read unless `recursive` is set.
pub fn sources_from_dir(dir: impl AsRef<Path>, recursive: bool) -> IngestionResult<Vec<SourceFile>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();

    let mut sources = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() {
            sources.push(SourceFile::from_path(entry.path())?);
        }
    }
    tracing::debug!(count = sources.len(), "loaded sources from directory");
    Ok(sources)
}

/// Read every regular file matching a glob `pattern`, in sorted path order.
pub fn sources_from_glob(pattern: &str) -> IngestionResult<Vec<SourceFile>> {
    let mut paths = glob::glob(pattern)?
        .collect::<Result<Vec<PathBuf>, glob::GlobError>>()
        .map_err(|e| IngestionError::Io(e.into()))?;
    paths.sort();

    paths
        .iter()
        .filter(|p| p.is_file())
        .map(SourceFile::from_path)
        .collect()
}
