//! # Table Sources
//!
//! Load a raw, column-oriented [`RawTable`] from disk. Sources only parse;
//! all schema and type checks belong to [`crate::dataset::validate`].
//!
//! | Extension | Source | Layout |
//! |-----------|--------|--------|
//! | `.csv` | [`CsvTableSource`] | header row, one record per line |
//! | `.json` | [`JsonTableSource`] | `{"label": [..]}` or `[{"label": v}, ..]` |
//! | `.xlsx`, `.xlsm`, `.xls` | [`XlsxTableSource`] | first worksheet, header row |
//!
//! ## Example
//!
//! ```rust
//! use report_core::table_source::CsvTableSource;
//!
//! let csv = "x,Shear force,Bending Moment\n0,10,0\n1,-10,0\n";
//! let table = CsvTableSource.read(csv.as_bytes(), "inline.csv").unwrap();
//! assert_eq!(table.columns.len(), 3);
//! assert_eq!(table.columns[0].values.len(), 2);
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use serde_json::Value;
use tracing::debug;

use crate::dataset::{RawColumn, RawTable, RawValue};
use crate::errors::{ReportError, ReportResult};

/// Produces a raw table from a file.
pub trait TableSource {
    /// # Errors
    ///
    /// * `Io` - the file is missing or unreadable
    /// * `Format` - the contents cannot be parsed
    fn load(&self, path: &Path) -> ReportResult<RawTable>;
}

/// Pick a source from the file extension.
pub fn table_source_for(path: &Path) -> ReportResult<Box<dyn TableSource>> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => Ok(Box::new(CsvTableSource)),
        "json" => Ok(Box::new(JsonTableSource)),
        "xlsx" | "xlsm" | "xls" => Ok(Box::new(XlsxTableSource)),
        other => Err(ReportError::format(
            path.display().to_string(),
            format!("unsupported table format '{}' (supported: .csv, .json, .xlsx, .xls)", other),
        )),
    }
}

fn open(path: &Path) -> ReportResult<File> {
    File::open(path).map_err(|e| ReportError::io("open", path.display().to_string(), e.to_string()))
}

fn cell_value(cell: &str) -> RawValue {
    if cell.is_empty() {
        RawValue::Empty
    } else {
        cell.parse::<f64>()
            .map(RawValue::Number)
            .unwrap_or_else(|_| RawValue::Text(cell.to_string()))
    }
}

// ============================================================================
// CSV
// ============================================================================

/// Comma-separated values with a header row.
///
/// Rows may be ragged: a short row leaves its trailing columns shorter, so
/// the validator reports the length mismatch instead of the parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableSource;

impl CsvTableSource {
    /// Parse CSV from any reader; `origin` names the input in errors.
    pub fn read<R: Read>(&self, reader: R, origin: &str) -> ReportResult<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| ReportError::format(origin, e.to_string()))?
            .clone();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(ReportError::format(origin, "missing header row"));
        }

        let mut table = RawTable {
            columns: headers
                .iter()
                .map(|label| RawColumn {
                    label: label.to_string(),
                    values: Vec::new(),
                })
                .collect(),
        };

        for record in reader.records() {
            let record = record.map_err(|e| ReportError::format(origin, e.to_string()))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            for (column, cell) in table.columns.iter_mut().zip(record.iter()) {
                column.values.push(cell_value(cell));
            }
        }

        debug!(origin, columns = table.columns.len(), "csv table loaded");
        Ok(table)
    }
}

impl TableSource for CsvTableSource {
    fn load(&self, path: &Path) -> ReportResult<RawTable> {
        self.read(open(path)?, &path.display().to_string())
    }
}

// ============================================================================
// JSON
// ============================================================================

/// JSON table, either column-oriented or a list of records.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTableSource;

impl JsonTableSource {
    /// Parse JSON from any reader; `origin` names the input in errors.
    pub fn read<R: Read>(&self, reader: R, origin: &str) -> ReportResult<RawTable> {
        let value: Value =
            serde_json::from_reader(reader).map_err(|e| ReportError::format(origin, e.to_string()))?;

        let table = match value {
            Value::Object(columns) => {
                let mut table = RawTable::new();
                for (label, cells) in columns {
                    let Value::Array(cells) = cells else {
                        return Err(ReportError::format(
                            origin,
                            format!("column '{}' is not an array", label),
                        ));
                    };
                    table.push_column(label, cells.iter().map(json_cell).collect());
                }
                table
            }
            Value::Array(records) => records_to_table(&records, origin)?,
            _ => {
                return Err(ReportError::format(
                    origin,
                    "expected an object of columns or an array of records",
                ))
            }
        };

        debug!(origin, columns = table.columns.len(), "json table loaded");
        Ok(table)
    }
}

impl TableSource for JsonTableSource {
    fn load(&self, path: &Path) -> ReportResult<RawTable> {
        self.read(open(path)?, &path.display().to_string())
    }
}

fn records_to_table(records: &[Value], origin: &str) -> ReportResult<RawTable> {
    let mut labels: Vec<String> = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(ReportError::format(origin, format!("record {} is not an object", i + 1)));
        };
        for label in fields.keys() {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
    }

    let mut table = RawTable::new();
    for label in labels {
        let values = records
            .iter()
            .map(|record| record.get(&label).map(json_cell).unwrap_or(RawValue::Empty))
            .collect();
        table.push_column(label, values);
    }
    Ok(table)
}

fn json_cell(value: &Value) -> RawValue {
    match value {
        Value::Null => RawValue::Empty,
        Value::Number(n) => n
            .as_f64()
            .map(RawValue::Number)
            .unwrap_or_else(|| RawValue::Text(n.to_string())),
        Value::String(s) => cell_value(s.trim()),
        other => RawValue::Text(other.to_string()),
    }
}

// ============================================================================
// Spreadsheets
// ============================================================================

/// Excel workbook; only the first worksheet is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxTableSource;

impl XlsxTableSource {
    /// Convert a worksheet range whose first row holds the column labels.
    pub fn read_range(&self, range: &Range<Data>, origin: &str) -> ReportResult<RawTable> {
        let mut rows = range.rows();
        let header = rows
            .next()
            .filter(|row| !is_blank_row(row))
            .ok_or_else(|| ReportError::format(origin, "missing header row"))?;

        let mut table = RawTable {
            columns: header
                .iter()
                .map(|label| RawColumn {
                    label: label.to_string().trim().to_string(),
                    values: Vec::new(),
                })
                .collect(),
        };

        for row in rows.filter(|row| !is_blank_row(row)) {
            for (column, cell) in table.columns.iter_mut().zip(row) {
                column.values.push(sheet_cell(cell));
            }
        }

        // Ranges are rectangular, so a short column arrives padded with
        // empty cells. Drop the padding and let validation see the length.
        for column in &mut table.columns {
            while column.values.last() == Some(&RawValue::Empty) {
                column.values.pop();
            }
        }

        debug!(origin, columns = table.columns.len(), "worksheet loaded");
        Ok(table)
    }
}

impl TableSource for XlsxTableSource {
    fn load(&self, path: &Path) -> ReportResult<RawTable> {
        // missing files are Io errors, not Format
        open(path)?;

        let origin = path.display().to_string();
        let mut workbook = open_workbook_auto(path).map_err(|e| ReportError::format(&origin, e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ReportError::format(&origin, "workbook has no worksheets"))?
            .map_err(|e| ReportError::format(&origin, e.to_string()))?;

        self.read_range(&range, &origin)
    }
}

fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| matches!(cell, Data::Empty))
}

fn sheet_cell(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::Float(f) => RawValue::Number(*f),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::String(s) => cell_value(s.trim()),
        other => RawValue::Text(other.to_string()),
    }
}
