//! Admission screening by extension and size, before any content is read.

use std::fmt;

use serde::Serialize;

use crate::types::{SourceFile, SourceKind};

/// Why a file was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscardReason {
    /// Extension outside `.csv`, `.xls`, `.xlsx` (or no extension at all).
    UnsupportedExtension { extension: Option<String> },
    /// Zero-byte file.
    EmptyFile,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedExtension { extension: Some(ext) } => {
                write!(f, "unsupported file type '.{ext}' (expected .csv, .xls or .xlsx)")
            }
            Self::UnsupportedExtension { extension: None } => {
                write!(f, "file has no extension (expected .csv, .xls or .xlsx)")
            }
            Self::EmptyFile => write!(f, "file is empty (0 bytes)"),
        }
    }
}

/// A file rejected at admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discard {
    pub file_name: String,
    pub reason: DiscardReason,
}

/// Outcome of screening a batch: admitted files in input order plus discards.
#[derive(Debug, Clone, Default)]
pub struct Admission<'a> {
    pub admitted: Vec<&'a SourceFile>,
    pub discarded: Vec<Discard>,
}

impl Admission<'_> {
    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty()
    }
}

/// Screen one file. Returns `Ok(kind)` when admitted.
pub fn classify(file: &SourceFile) -> Result<SourceKind, DiscardReason> {
    let kind = file.kind().ok_or_else(|| DiscardReason::UnsupportedExtension {
        extension: std::path::Path::new(&file.name)
            .extension()
            .map(|e| e.to_string_lossy().into_owned()),
    })?;
    if file.size == 0 {
        return Err(DiscardReason::EmptyFile);
    }
    Ok(kind)
}

/// Split a batch into admitted files and discards, preserving input order.
///
/// No content is parsed here; encoding and structural problems surface later as notices.
pub fn admit(files: &[SourceFile]) -> Admission<'_> {
    let mut admission = Admission::default();
    for file in files {
        match classify(file) {
            Ok(_) => admission.admitted.push(file),
            Err(reason) => {
                tracing::debug!(file = %file.name, %reason, "discarded at admission");
                admission.discarded.push(Discard {
                    file_name: file.name.clone(),
                    reason,
                });
            }
        }
    }
    admission
}

#[cfg(test)]
mod tests {
    use super::{admit, classify, DiscardReason};
    use crate::types::{SourceFile, SourceKind};

    #[test]
    fn classify_accepts_supported_extensions_case_insensitively() {
        assert_eq!(classify(&SourceFile::new("a.CSV", "x")), Ok(SourceKind::DelimitedText));
        assert_eq!(classify(&SourceFile::new("b.xls", "x")), Ok(SourceKind::LegacySpreadsheet));
        assert_eq!(classify(&SourceFile::new("c.Xlsx", "x")), Ok(SourceKind::ModernSpreadsheet));
    }

    #[test]
    fn classify_rejects_unknown_extension_and_empty_files() {
        assert_eq!(
            classify(&SourceFile::new("notes.txt", "x")),
            Err(DiscardReason::UnsupportedExtension {
                extension: Some("txt".to_string())
            })
        );
        assert_eq!(
            classify(&SourceFile::new("README", "x")),
            Err(DiscardReason::UnsupportedExtension { extension: None })
        );
        assert_eq!(classify(&SourceFile::new("empty.csv", "")), Err(DiscardReason::EmptyFile));
    }

    #[test]
    fn admit_uses_declared_size() {
        let mut declared_empty = SourceFile::new("a.csv", "a;b\n1;2\n");
        declared_empty.size = 0;
        let files = vec![declared_empty];
        let admission = admit(&files);
        assert!(admission.is_empty());
        assert_eq!(admission.discarded[0].reason, DiscardReason::EmptyFile);
    }

    #[test]
    fn admit_preserves_order_and_separates_discards() {
        let files = vec![
            SourceFile::new("one.csv", "a\n1\n"),
            SourceFile::new("image.png", "\u{89}PNG"),
            SourceFile::new("two.xlsx", "PK"),
            SourceFile::new("zero.xls", ""),
        ];
        let admission = admit(&files);

        let names: Vec<&str> = admission.admitted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["one.csv", "two.xlsx"]);
        let discarded: Vec<&str> = admission.discarded.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(discarded, vec!["image.png", "zero.xls"]);
        assert!(admission.discarded[1].reason.to_string().contains("0 bytes"));
    }
}
