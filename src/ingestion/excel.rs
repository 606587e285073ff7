//! Workbook ingestion (`.xls`, `.xlsx`): every sheet becomes its own [`ParseResult`].

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::processing::unique_headers;
use crate::types::{ParseResult, SourceFile};

/// Extract every data-bearing sheet of a workbook source.
///
/// Behavior:
/// - Sheets are visited in workbook order
/// - The first non-empty row of a sheet is its header row; header names are trimmed and
///   duplicates get a numeric suffix (`name`, `name_1`, ...)
/// - Fully empty rows are skipped; empty cells become `None`
/// - Sheets without data rows are skipped silently, as are sheets that fail to decode
///
/// Fails with [`IngestionError::Excel`] when the workbook cannot be opened, and with
/// [`IngestionError::EmptySource`] when it opens but no sheet has data.
pub fn ingest_excel_from_source(file: &SourceFile) -> IngestionResult<Vec<ParseResult>> {
    ingest_excel_from_bytes(&file.name, &file.content)
}

/// Same as [`ingest_excel_from_source`] for a name and a byte slice.
pub fn ingest_excel_from_bytes(name: &str, bytes: &[u8]) -> IngestionResult<Vec<ParseResult>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let mut results = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&sheet) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(file = name, sheet = %sheet, error = %e, "skipping unreadable sheet");
                continue;
            }
        };
        match extract_sheet(name, &sheet, &range) {
            Some(result) => results.push(result),
            None => tracing::debug!(file = name, sheet = %sheet, "skipping sheet without data rows"),
        }
    }

    if results.is_empty() {
        return Err(IngestionError::EmptySource {
            file: name.to_string(),
            message: "workbook has no sheet with data rows".to_string(),
        });
    }
    Ok(results)
}

fn extract_sheet(file: &str, sheet: &str, range: &Range<Data>) -> Option<ParseResult> {
    let mut rows_iter = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));

    let header_cells = rows_iter.next()?;
    let fields = unique_headers(header_cells.iter().map(cell_to_string));
    let width = fields.len();

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for row in rows_iter {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let mut out: Vec<Option<String>> = row.iter().take(width).map(cell_to_raw).collect();
        out.resize(width, None);
        rows.push(out);
    }

    if rows.is_empty() {
        return None;
    }
    Some(ParseResult::new(format!("{file} [{sheet}]"), fields, rows))
}

fn cell_to_raw(c: &Data) -> Option<String> {
    match c {
        Data::Empty => None,
        _ => Some(cell_to_string(c)),
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => datetime_to_string(d),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

/// Render a date-formatted cell as ISO 8601 text instead of its serial number.
///
/// Dates without a time part render as `YYYY-MM-DD`, serials below one day as `HH:MM:SS`, and
/// duration-formatted cells as `[h]:mm:ss`.
fn datetime_to_string(d: &ExcelDateTime) -> String {
    if d.is_duration() {
        let total = (d.as_f64() * 86_400.0).round() as i64;
        let sign = if total < 0 { "-" } else { "" };
        let total = total.abs();
        return format!("{sign}{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60);
    }

    let (year, month, day, hour, min, sec, milli) = d.to_ymd_hms_milli();
    let time = if milli == 0 {
        format!("{hour:02}:{min:02}:{sec:02}")
    } else {
        format!("{hour:02}:{min:02}:{sec:02}.{milli:03}")
    };
    if (0.0..1.0).contains(&d.as_f64()) {
        return time;
    }
    if (hour, min, sec, milli) == (0, 0, 0, 0) {
        format!("{year:04}-{month:02}-{day:02}")
    } else {
        format!("{year:04}-{month:02}-{day:02}T{time}")
    }
}

#[cfg(test)]
mod tests {
    use calamine::{Data, ExcelDateTime, ExcelDateTimeType};

    use super::{cell_to_raw, cell_to_string, ingest_excel_from_bytes};
    use crate::error::IngestionError;

    #[test]
    fn integral_floats_render_without_fraction() {
        assert_eq!(cell_to_string(&Data::Float(42.0)), "42");
        assert_eq!(cell_to_string(&Data::Float(98.5)), "98.5");
        assert_eq!(cell_to_string(&Data::Int(-7)), "-7");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }

    #[test]
    fn date_cells_render_as_iso_text() {
        let date = |value| Data::DateTime(ExcelDateTime::new(value, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_to_string(&date(45352.0)), "2024-03-01");
        assert_eq!(cell_to_string(&date(45352.5)), "2024-03-01T12:00:00");
        assert_eq!(cell_to_string(&date(0.75)), "18:00:00");
    }

    #[test]
    fn duration_cells_render_as_elapsed_time() {
        let span = Data::DateTime(ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false));
        assert_eq!(cell_to_string(&span), "36:00:00");
    }

    #[test]
    fn empty_cells_are_absent_not_blank_text() {
        assert_eq!(cell_to_raw(&Data::Empty), None);
        assert_eq!(cell_to_raw(&Data::String(String::new())), Some(String::new()));
    }

    #[test]
    fn unreadable_workbook_is_an_excel_error() {
        let err = ingest_excel_from_bytes("broken.xlsx", b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, IngestionError::Excel(_)));
    }
}
