use rust_data_consolidation::ingestion::excel::ingest_excel_from_source;
use rust_data_consolidation::ingestion::{consolidate, IngestionOptions};
use rust_data_consolidation::types::{DataType, SourceFile, Value};
use rust_data_consolidation::IngestionError;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

fn people_sheet(wb: &mut Workbook, name: &str, first_id: i32) {
    let ws = wb.add_worksheet();
    ws.set_name(name).unwrap();
    ws.write_string(0, 0, " id ").unwrap();
    ws.write_string(0, 1, "name").unwrap();
    ws.write_string(0, 2, "score").unwrap();
    ws.write_string(0, 3, "active").unwrap();

    ws.write_number(1, 0, first_id).unwrap();
    ws.write_string(1, 1, "Ada").unwrap();
    ws.write_number(1, 2, 98.5).unwrap();
    ws.write_boolean(1, 3, true).unwrap();

    // Row 2 leaves `score` empty.
    ws.write_number(2, 0, first_id + 1).unwrap();
    ws.write_string(2, 1, "Grace").unwrap();
    ws.write_boolean(2, 3, false).unwrap();
}

fn three_sheets_with_empty_middle() -> Vec<u8> {
    let mut wb = Workbook::new();
    people_sheet(&mut wb, "First", 1);
    wb.add_worksheet().set_name("Empty").unwrap();
    people_sheet(&mut wb, "Third", 10);
    wb.save_to_buffer().unwrap()
}

#[test]
fn every_data_sheet_becomes_its_own_result() {
    let file = SourceFile::new("book.xlsx", three_sheets_with_empty_middle());
    let results = ingest_excel_from_source(&file).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].source, "book.xlsx [First]");
    assert_eq!(results[1].source, "book.xlsx [Third]");
    assert_eq!(results[0].fields, vec!["id", "name", "score", "active"]);
    assert_eq!(results[0].rows.len(), 2);
}

#[test]
fn empty_cells_are_absent_and_numbers_render_as_text() {
    let file = SourceFile::new("book.xlsx", three_sheets_with_empty_middle());
    let results = ingest_excel_from_source(&file).unwrap();

    let row = &results[1].rows[1];
    assert_eq!(row[0].as_deref(), Some("11"));
    assert_eq!(row[1].as_deref(), Some("Grace"));
    assert_eq!(row[2], None);
    assert_eq!(row[3].as_deref(), Some("false"));
    assert_eq!(results[0].rows[0][2].as_deref(), Some("98.5"));
}

#[test]
fn empty_middle_sheet_adds_no_notice() {
    let file = SourceFile::new("book.xlsx", three_sheets_with_empty_middle());
    let out = consolidate([&file], &IngestionOptions::default()).unwrap();

    assert!(out.notices.is_empty());
    assert_eq!(out.dataset.row_count(), 4);
    assert_eq!(out.dataset.schema.data_type_of("id"), Some(DataType::Int64));
    assert_eq!(out.dataset.schema.data_type_of("score"), Some(DataType::Float64));
    assert_eq!(out.dataset.schema.data_type_of("active"), Some(DataType::Bool));
    assert_eq!(out.dataset.value(1, "score"), Some(&Value::Null));
    assert_eq!(out.dataset.value(2, "id"), Some(&Value::Int64(10)));
}

#[test]
fn workbook_with_only_empty_sheets_is_an_empty_source() {
    let mut wb = Workbook::new();
    wb.add_worksheet().set_name("A").unwrap();
    let ws = wb.add_worksheet();
    ws.set_name("HeaderOnly").unwrap();
    ws.write_string(0, 0, "id").unwrap();
    let file = SourceFile::new("hollow.xlsx", wb.save_to_buffer().unwrap());

    let err = ingest_excel_from_source(&file).unwrap_err();
    assert!(matches!(err, IngestionError::EmptySource { ref file, .. } if file == "hollow.xlsx"));
}

#[test]
fn corrupt_workbook_fails_with_one_file_level_notice() {
    let bad = SourceFile::new("corrupt.xlsx", b"PK\x03\x04 this is not a zip".to_vec());
    let good = SourceFile::new("ok.csv", "a;b\n5;6\n");

    let out = consolidate([&bad, &good], &IngestionOptions::default()).unwrap();
    assert_eq!(out.notices.len(), 1);
    assert_eq!(out.notices[0].file_name, "corrupt.xlsx");
    assert_eq!(out.headers(), vec!["a", "b"]);
}

#[test]
fn date_cells_come_back_as_iso_text() {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let stamp_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    ws.write_string(0, 0, "day").unwrap();
    ws.write_string(0, 1, "stamp").unwrap();
    let day = ExcelDateTime::from_ymd(2024, 3, 1).unwrap();
    let stamp = ExcelDateTime::from_ymd(2024, 3, 1).unwrap().and_hms(12, 30, 0).unwrap();
    ws.write_datetime_with_format(1, 0, &day, &date_format).unwrap();
    ws.write_datetime_with_format(1, 1, &stamp, &stamp_format).unwrap();
    let file = SourceFile::new("dates.xlsx", wb.save_to_buffer().unwrap());

    let results = ingest_excel_from_source(&file).unwrap();
    assert_eq!(results[0].rows[0][0].as_deref(), Some("2024-03-01"));
    assert_eq!(results[0].rows[0][1].as_deref(), Some("2024-03-01T12:30:00"));

    let out = consolidate([&file], &IngestionOptions::default()).unwrap();
    assert_eq!(out.dataset.schema.data_type_of("day"), Some(DataType::Utf8));
    assert_eq!(out.dataset.value(0, "day"), Some(&Value::Utf8("2024-03-01".to_string())));
}
