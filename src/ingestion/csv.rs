//! Delimited text ingestion with encoding and delimiter discovery.
//!
//! Neither the text encoding nor the delimiter of an input is declared, so every combination from
//! a small fixed grid is tried and the one that splits the header into the most columns wins.
//! An incorrect delimiter under-splits the header into fewer, wider columns, which makes the column
//! count the most reliable signal available.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{Encoding, ISO_8859_15, UTF_8, WINDOWS_1252};
use rayon::prelude::*;

use crate::error::{IngestionError, IngestionResult};
use crate::processing::unique_headers;
use crate::types::{ParseResult, RowDiagnostic, SourceFile};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One (encoding, delimiter) interpretation of a text source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub encoding: &'static Encoding,
    pub delimiter: u8,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "encoding={} delimiter={:?}",
            self.encoding.name(),
            self.delimiter as char
        )
    }
}

/// The search grid: encodings in preference order, delimiters in preference order.
///
/// The default grid is strict UTF-8, windows-1252 and ISO-8859-15, crossed with `;`, `,`, tab and `|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectCandidates {
    pub encodings: Vec<&'static Encoding>,
    pub delimiters: Vec<u8>,
}

impl Default for DialectCandidates {
    fn default() -> Self {
        Self {
            encodings: vec![UTF_8, WINDOWS_1252, ISO_8859_15],
            delimiters: vec![b';', b',', b'\t', b'|'],
        }
    }
}

impl DialectCandidates {
    /// Enumerate the grid, encodings outermost. This order is the tie-break order.
    pub fn grid(&self) -> Vec<Dialect> {
        self.encodings
            .iter()
            .flat_map(|&encoding| {
                self.delimiters
                    .iter()
                    .map(move |&delimiter| Dialect { encoding, delimiter })
            })
            .collect()
    }
}

/// What one dialect produced. Only lives for the duration of the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAttempt {
    pub dialect: Dialect,
    pub fields: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub diagnostics: Vec<RowDiagnostic>,
}

impl ParseAttempt {
    pub fn column_count(&self) -> usize {
        self.fields.len()
    }
}

/// Pick the candidate with the strictly greatest score.
///
/// Ties keep the earliest candidate, so the enumeration order decides between equal scores.
/// Candidates scoring zero are never selected.
pub fn select_best<T, F>(candidates: impl IntoIterator<Item = T>, score: F) -> Option<T>
where
    F: Fn(&T) -> usize,
{
    let mut best: Option<(usize, T)> = None;
    for candidate in candidates {
        let s = score(&candidate);
        if s == 0 {
            continue;
        }
        match &best {
            Some((best_score, _)) if s <= *best_score => {}
            _ => best = Some((s, candidate)),
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// Parse a text source, trying every dialect of `candidates` and keeping the best one.
///
/// Fails with [`IngestionError::NoValidDialect`] when no dialect yields a header row, and with
/// [`IngestionError::EmptySource`] when the winning dialect finds a header but no data rows.
/// Malformed rows of the winning dialect are kept as [`RowDiagnostic`]s, never as errors.
pub fn ingest_csv_from_source(
    file: &SourceFile,
    candidates: &DialectCandidates,
) -> IngestionResult<ParseResult> {
    ingest_csv_from_bytes(&file.name, &file.content, candidates)
}

/// Same as [`ingest_csv_from_source`] for a name and a byte slice.
pub fn ingest_csv_from_bytes(
    name: &str,
    bytes: &[u8],
    candidates: &DialectCandidates,
) -> IngestionResult<ParseResult> {
    let grid = candidates.grid();

    // Attempts are independent; collecting keeps enumeration order for the tie-break.
    let attempts: Vec<Option<ParseAttempt>> = grid
        .par_iter()
        .map(|&dialect| parse_with_dialect(name, bytes, dialect))
        .collect();

    let best = select_best(attempts.into_iter().flatten(), ParseAttempt::column_count).ok_or_else(
        || IngestionError::NoValidDialect {
            file: name.to_string(),
        },
    )?;

    tracing::debug!(
        file = name,
        dialect = %best.dialect,
        columns = best.column_count(),
        rows = best.rows.len(),
        diagnostics = best.diagnostics.len(),
        "selected dialect"
    );

    if best.rows.is_empty() {
        return Err(IngestionError::EmptySource {
            file: name.to_string(),
            message: "header row found but no data rows".to_string(),
        });
    }

    Ok(ParseResult {
        source: name.to_string(),
        fields: best.fields,
        rows: best.rows,
        diagnostics: best.diagnostics,
    })
}

/// Parse `bytes` under a single dialect.
///
/// Returns `None` when the bytes do not decode under the dialect's encoding or when no header
/// row is found. Blank lines, including lines holding only whitespace and delimiters, are skipped
/// everywhere, so the header is the first non-blank record. Header names are trimmed and
/// repeats are suffixed (`id`, `id_1`, ...) so no column is shadowed by a namesake.
pub fn parse_with_dialect(name: &str, bytes: &[u8], dialect: Dialect) -> Option<ParseAttempt> {
    let text = decode_strict(bytes, dialect.encoding)?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .from_reader(text.as_bytes());

    let mut fields: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    let mut diagnostics = Vec::new();
    let mut data_row = 0usize;

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                if fields.is_none() {
                    return None;
                }
                data_row += 1;
                diagnostics.push(RowDiagnostic {
                    file_name: name.to_string(),
                    row: data_row,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let Some(width) = fields.as_ref().map(Vec::len) else {
            fields = Some(unique_headers(record.iter()));
            continue;
        };

        data_row += 1;
        if record.len() != width {
            let kind = if record.len() < width {
                "too few fields"
            } else {
                "too many fields"
            };
            diagnostics.push(RowDiagnostic {
                file_name: name.to_string(),
                row: data_row,
                message: format!("{kind}: expected {width}, found {}", record.len()),
            });
        }

        let mut row: Vec<Option<String>> = record
            .iter()
            .take(width)
            .map(|f| Some(f.to_owned()))
            .collect();
        row.resize(width, None);
        rows.push(row);
    }

    let fields = fields?;
    if fields.is_empty() {
        return None;
    }

    Some(ParseAttempt {
        dialect,
        fields,
        rows,
        diagnostics,
    })
}

/// Decode without replacement: UTF-8 must be valid (a leading BOM is dropped), and legacy
/// encodings must map every byte.
fn decode_strict<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    if encoding == UTF_8 {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        return UTF_8.decode_without_bom_handling_and_without_replacement(bytes);
    }
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use encoding_rs::{UTF_8, WINDOWS_1252};

    use super::{
        ingest_csv_from_bytes, parse_with_dialect, select_best, Dialect, DialectCandidates,
    };
    use crate::error::IngestionError;

    #[test]
    fn select_best_prefers_strictly_greater_and_first_on_ties() {
        assert_eq!(select_best(vec![1, 3, 2, 3], |v| *v), Some(3));

        let tagged = vec![("a", 2), ("b", 4), ("c", 4), ("d", 1)];
        assert_eq!(select_best(tagged, |(_, s)| *s), Some(("b", 4)));
    }

    #[test]
    fn select_best_ignores_zero_scores() {
        assert_eq!(select_best(vec![0, 0], |v| *v), None);
        assert_eq!(select_best(Vec::<usize>::new(), |v| *v), None);
        assert_eq!(select_best(vec![0, 1], |v| *v), Some(1));
    }

    #[test]
    fn grid_enumerates_encodings_outermost() {
        let grid = DialectCandidates::default().grid();
        assert_eq!(grid.len(), 12);
        assert_eq!(grid[0], Dialect { encoding: UTF_8, delimiter: b';' });
        assert_eq!(grid[1].delimiter, b',');
        assert_eq!(grid[4], Dialect { encoding: WINDOWS_1252, delimiter: b';' });
    }

    #[test]
    fn semicolon_wins_when_it_yields_more_columns() {
        let input = b"name;city;score\nAda;Paris, FR;1\nLinus;Oslo;2\n";
        let pr = ingest_csv_from_bytes("people.csv", input, &DialectCandidates::default()).unwrap();
        assert_eq!(pr.fields, vec!["name", "city", "score"]);
        assert_eq!(pr.rows[0][1].as_deref(), Some("Paris, FR"));
        assert!(pr.diagnostics.is_empty());
    }

    #[test]
    fn comma_wins_when_semicolon_does_not_split() {
        let input = b"a,b,c\n1,2,3\n";
        let pr = ingest_csv_from_bytes("plain.csv", input, &DialectCandidates::default()).unwrap();
        assert_eq!(pr.fields, vec!["a", "b", "c"]);
        assert_eq!(pr.rows, vec![vec![Some("1".into()), Some("2".into()), Some("3".into())]]);
    }

    #[test]
    fn tie_between_delimiters_resolves_to_enumeration_order() {
        // Both ';' and ',' split the header in two; ';' is tried first.
        let input = b"a;b,c\n1;2,3\n";
        let pr = ingest_csv_from_bytes("tie.csv", input, &DialectCandidates::default()).unwrap();
        assert_eq!(pr.fields, vec!["a", "b,c"]);
    }

    #[test]
    fn invalid_utf8_falls_back_to_legacy_encoding() {
        // "café" in windows-1252.
        let input = b"name;drink\nAda;caf\xE9\n";
        assert!(parse_with_dialect("x.csv", input, Dialect { encoding: UTF_8, delimiter: b';' }).is_none());

        let pr = ingest_csv_from_bytes("legacy.csv", input, &DialectCandidates::default()).unwrap();
        assert_eq!(pr.rows[0][1].as_deref(), Some("café"));
    }

    #[test]
    fn utf8_bom_is_stripped_from_first_header() {
        let input = "\u{feff}id;name\n1;Ada\n".as_bytes();
        let pr = ingest_csv_from_bytes("bom.csv", input, &DialectCandidates::default()).unwrap();
        assert_eq!(pr.fields, vec!["id", "name"]);
    }

    #[test]
    fn blank_and_delimiter_only_lines_are_skipped() {
        let input = b"\n  \na;b\n\n;\n1;2\n   ;  \n3;4\n";
        let attempt =
            parse_with_dialect("blank.csv", input, Dialect { encoding: UTF_8, delimiter: b';' }).unwrap();
        assert_eq!(attempt.fields, vec!["a", "b"]);
        assert_eq!(attempt.rows.len(), 2);
        assert!(attempt.diagnostics.is_empty());
    }

    #[test]
    fn malformed_rows_become_diagnostics_not_errors() {
        let input = b"a;b;c\n1;2;3\n4;5\n6;7;8;9\n";
        let pr = ingest_csv_from_bytes("ragged.csv", input, &DialectCandidates::default()).unwrap();
        assert_eq!(pr.rows.len(), 3);
        assert_eq!(pr.rows[1], vec![Some("4".into()), Some("5".into()), None]);
        assert_eq!(pr.rows[2].len(), 3);

        let rows: Vec<usize> = pr.diagnostics.iter().map(|d| d.row).collect();
        assert_eq!(rows, vec![2, 3]);
        assert!(pr.diagnostics[0].message.contains("too few fields"));
        assert!(pr.diagnostics[1].message.contains("too many fields"));
    }

    #[test]
    fn header_without_rows_is_an_empty_source() {
        let err = ingest_csv_from_bytes("header.csv", b"a;b\n\n", &DialectCandidates::default())
            .unwrap_err();
        assert!(matches!(err, IngestionError::EmptySource { ref file, .. } if file == "header.csv"));
    }

    #[test]
    fn whitespace_only_content_has_no_valid_dialect() {
        let err = ingest_csv_from_bytes("blank.csv", b" \n\t\n", &DialectCandidates::default())
            .unwrap_err();
        assert!(matches!(err, IngestionError::NoValidDialect { ref file } if file == "blank.csv"));
        assert!(err.to_string().contains("blank.csv"));
    }
}
