//! Core data model types for consolidation.
//!
//! Sources enter as [`SourceFile`]s, are parsed into untyped [`ParseResult`]s, merged into a
//! single [`RawTable`] and finally typed into a [`DataSet`] described by a [`Schema`].

use std::fs;
use std::path::Path;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::IngestionResult;
use crate::ingestion::IngestionSeverity;

/// Supported source families, decided from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Delimited text (`.csv`).
    DelimitedText,
    /// Legacy binary workbook (`.xls`).
    LegacySpreadsheet,
    /// Office Open XML workbook (`.xlsx`).
    ModernSpreadsheet,
}

impl SourceKind {
    /// Parse a source kind from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::DelimitedText),
            "xls" => Some(Self::LegacySpreadsheet),
            "xlsx" => Some(Self::ModernSpreadsheet),
            _ => None,
        }
    }

    /// Parse a source kind from the extension of a file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        Self::from_extension(ext)
    }
}

/// One input file: name, declared byte size and raw content.
///
/// The pipeline only ever borrows a `SourceFile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name, including extension.
    pub name: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Raw file content.
    pub content: Vec<u8>,
}

impl SourceFile {
    /// Create a source whose declared size is the content length.
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// Read a source from disk. The name is the final path component.
    pub fn from_path(path: impl AsRef<Path>) -> IngestionResult<Self> {
        let path = path.as_ref();
        let content = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, content))
    }

    /// Source kind from the file extension, if supported.
    pub fn kind(&self) -> Option<SourceKind> {
        SourceKind::from_file_name(&self.name)
    }
}

/// Logical data type of a consolidated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataType {
    /// Boolean.
    #[serde(rename = "boolean")]
    Bool,
    /// 64-bit signed integer.
    #[serde(rename = "integer")]
    Int64,
    /// 64-bit floating point number.
    #[serde(rename = "number")]
    Float64,
    /// UTF-8 string.
    #[serde(rename = "string")]
    Utf8,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered, typed column set of a [`DataSet`].
///
/// This is also the column type profile produced by inference and consumed by conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Data type of a field by name, if present.
    pub fn data_type_of(&self, name: &str) -> Option<DataType> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.data_type)
    }
}

/// A single typed value in a [`DataSet`].
///
/// Serializes as the bare JSON value (`null`, `true`, `7`, `1.5`, `"text"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

/// In-memory consolidated dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields, so every row
/// carries exactly one value per header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema.fields.is_empty() && self.rows.is_empty()
    }

    /// Header names in order.
    pub fn headers(&self) -> Vec<String> {
        self.schema.field_names().map(str::to_owned).collect()
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// One row as ordered `(header, value)` pairs.
    pub fn record(&self, row: usize) -> Option<Vec<(&str, &Value)>> {
        let values = self.rows.get(row)?;
        Some(self.schema.field_names().zip(values.iter()).collect())
    }
}

struct RowAsMap<'a> {
    schema: &'a Schema,
    values: &'a [Value],
}

impl Serialize for RowAsMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.schema.field_names().zip(self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RowsAsMaps<'a>(&'a DataSet);

impl Serialize for RowsAsMaps<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.rows.iter().map(|values| RowAsMap {
            schema: &self.0.schema,
            values,
        }))
    }
}

impl Serialize for DataSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let types: Vec<DataType> = self.schema.fields.iter().map(|f| f.data_type).collect();
        let mut state = serializer.serialize_struct("DataSet", 3)?;
        state.serialize_field("headers", &self.headers())?;
        state.serialize_field("types", &types)?;
        state.serialize_field("rows", &RowsAsMaps(self))?;
        state.end()
    }
}

/// Untyped table parsed from one text source or one workbook sheet.
///
/// Rows are positional against `fields`; a row shorter than `fields` simply lacks the trailing
/// keys. `None` marks an absent cell, `Some` carries the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseResult {
    /// Label of the source (`file` or `file [sheet]`).
    pub source: String,
    /// Field names in source order, as read.
    pub fields: Vec<String>,
    /// Raw rows.
    pub rows: Vec<Vec<Option<String>>>,
    /// Informational diagnostics for malformed rows.
    pub diagnostics: Vec<RowDiagnostic>,
}

impl ParseResult {
    pub fn new(source: impl Into<String>, fields: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            source: source.into(),
            fields,
            rows,
            diagnostics: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Unified, still untyped table: one header set, every row exactly `headers.len()` long.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Non-fatal record of a source that was skipped or failed during processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingNotice {
    pub file_name: String,
    pub reason: String,
    pub severity: IngestionSeverity,
}

impl ProcessingNotice {
    pub fn new(file_name: impl Into<String>, reason: impl Into<String>, severity: IngestionSeverity) -> Self {
        Self {
            file_name: file_name.into(),
            reason: reason.into(),
            severity,
        }
    }
}

/// Informational note about one malformed row inside an accepted text parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDiagnostic {
    pub file_name: String,
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    pub message: String,
}
