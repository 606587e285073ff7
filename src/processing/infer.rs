//! Sample-based column type inference and dataset-wide conversion.
//!
//! Inference runs in two phases:
//!
//! 1. [`infer_schema`] decides one [`DataType`] per column from the first `sample_rows` rows.
//! 2. [`apply_schema`] converts every cell of the full table under that [`Schema`].
//!
//! Classification eliminates candidates (`Bool`, `Int64`, `Float64`, in preference order) and never
//! promotes; `Utf8` is the fallback. Blank cells never eliminate anything. During conversion a cell
//! that does not match its column's recognizer keeps its original text instead of failing.

use crate::types::{DataSet, DataType, Field, RawTable, Schema, Value};

/// Rows examined per column when deciding its type.
pub const DEFAULT_SAMPLE_ROWS: usize = 500;

/// `true`, `false`, `yes`, `no`, `1`, `0`, case-insensitive.
pub fn is_bool_token(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "1" | "0"
    )
}

/// Optional leading minus followed by one or more ASCII digits.
pub fn is_integer_token(s: &str) -> bool {
    let s = s.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parses as a finite decimal number.
pub fn is_number_token(s: &str) -> bool {
    parse_finite(s).is_some()
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

#[derive(Debug, Clone, Copy)]
struct TypeCandidate {
    non_empty: usize,
    boolean: bool,
    integer: bool,
    number: bool,
}

impl TypeCandidate {
    fn new() -> Self {
        Self {
            non_empty: 0,
            boolean: true,
            integer: true,
            number: true,
        }
    }

    fn update(&mut self, raw: Option<&str>) {
        let Some(value) = raw else {
            return;
        };
        if value.trim().is_empty() {
            return;
        }
        self.non_empty += 1;
        self.boolean = self.boolean && is_bool_token(value);
        self.integer = self.integer && is_integer_token(value);
        self.number = self.number && is_number_token(value);
    }

    fn decide(&self) -> DataType {
        if self.boolean && self.non_empty > 0 {
            DataType::Bool
        } else if self.integer {
            DataType::Int64
        } else if self.number {
            DataType::Float64
        } else {
            DataType::Utf8
        }
    }
}

/// Classify one column from sampled raw values.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> DataType {
    let mut candidate = TypeCandidate::new();
    for value in values {
        candidate.update(value);
    }
    candidate.decide()
}

/// Phase 1: decide each column's type from at most `sample_rows` leading rows.
pub fn infer_schema(table: &RawTable, sample_rows: usize) -> Schema {
    let sample = &table.rows[..table.rows.len().min(sample_rows)];
    let fields = table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let data_type =
                infer_column_type(sample.iter().map(|row| row.get(idx).and_then(|v| v.as_deref())));
            tracing::debug!(column = %name, ?data_type, sampled = sample.len(), "inferred column type");
            Field::new(name.clone(), data_type)
        })
        .collect();
    Schema::new(fields)
}

/// Convert one raw cell under `data_type`.
///
/// Blank cells become [`Value::Null`]. A value that does not itself match the type's recognizer is
/// kept as [`Value::Utf8`] with its original text.
pub fn convert_cell(data_type: DataType, raw: Option<String>) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };
    if raw.trim().is_empty() {
        return Value::Null;
    }

    match data_type {
        DataType::Bool if is_bool_token(&raw) => Value::Bool(parse_bool(&raw)),
        DataType::Int64 if is_integer_token(&raw) => match raw.trim().parse::<i64>() {
            Ok(v) => Value::Int64(v),
            // Out of i64 range.
            Err(_) => Value::Utf8(raw),
        },
        DataType::Float64 => match parse_finite(&raw) {
            Some(v) => Value::Float64(v),
            None => Value::Utf8(raw),
        },
        _ => Value::Utf8(raw),
    }
}

/// Phase 2: convert every row of `table` under `schema`.
///
/// `schema` must describe `table.headers` in the same order.
pub fn apply_schema(schema: &Schema, table: RawTable) -> DataSet {
    let types: Vec<DataType> = schema.fields.iter().map(|f| f.data_type).collect();
    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(types.iter())
                .map(|(raw, &data_type)| convert_cell(data_type, raw))
                .collect()
        })
        .collect();
    DataSet::new(schema.clone(), rows)
}

/// Run both phases.
pub fn infer_and_convert(table: RawTable, sample_rows: usize) -> DataSet {
    let schema = infer_schema(&table, sample_rows);
    apply_schema(&schema, table)
}
