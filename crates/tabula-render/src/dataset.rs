//! Tabular input data.
//!
//! A [`TabularDataset`] is an ordered list of unique column names plus rows
//! holding exactly one [`CellValue`] per column. Construction validates the
//! shape, so every later stage can index rows by column position without
//! checking.
//!
//! Datasets can be built directly, read from CSV, or read from JSON. A few
//! preparation helpers (hide, filter, sort, chunk) return new datasets and
//! leave the original untouched.
//!
//! ```rust
//! use tabula_render::{CellValue, TabularDataset};
//!
//! let data = TabularDataset::new(
//!     vec!["Node".into(), "Force_kN".into()],
//!     vec![
//!         vec![CellValue::Int(1), CellValue::Float(125.5)],
//!         vec![CellValue::Int(2), CellValue::Missing],
//!     ],
//! ).unwrap();
//!
//! assert_eq!(data.num_columns(), 2);
//! assert_eq!(data.column_index("Force_kN"), Some(1));
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::Read;

use serde_json::Value;

use crate::error::{Result, TableError};

/// A single scalar cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    /// Explicit missing marker (null, empty CSV field).
    Missing,
}

impl CellValue {
    /// Parses a raw field the way CSV cells are interpreted: empty means
    /// missing, integers and floats become numbers, everything else is text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Missing;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }
        CellValue::Text(raw.to_string())
    }

    /// Numeric view of the cell, if it has one.
    ///
    /// Text cells are parsed after normalising a decimal comma and removing
    /// spaces. NaN and infinities are not numbers for ranking purposes.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_extended_f64().filter(|v| v.is_finite())
    }

    /// Like [`CellValue::as_f64`], but keeps infinities.
    pub fn as_extended_f64(&self) -> Option<f64> {
        let value = match self {
            CellValue::Int(i) => *i as f64,
            CellValue::Float(f) => *f,
            CellValue::Text(s) => parse_number(s)?,
            CellValue::Missing => return None,
        };
        (!value.is_nan()).then_some(value)
    }

    /// The plain display string, before any missing-value handling.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Missing => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

/// Parses numeric text, accepting a decimal comma and embedded spaces.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Integral floats keep one decimal (`0.0`); others use the shortest form.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

/// Ordered columns and rows of scalar values.
#[derive(Clone, Debug, PartialEq)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl TabularDataset {
    /// Creates a dataset, validating unique names and row lengths.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::RowLength {
                    row: i,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Reads a CSV document whose first record holds the column names.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(CellValue::parse).collect());
        }
        Self::new(columns, rows)
    }

    /// Reads a CSV document from a string.
    pub fn from_csv_str(csv: &str) -> Result<Self> {
        Self::from_csv_reader(csv.as_bytes())
    }

    /// Builds a dataset from JSON.
    ///
    /// Accepted shapes:
    /// - an array of objects: columns come from the first object's keys, in
    ///   order; later objects must have the same keys
    /// - an object `{ "columns": [...], "rows": [[...], ...] }`
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let Some(Value::Object(first)) = items.first() else {
                    if items.is_empty() {
                        return Self::new(Vec::new(), Vec::new());
                    }
                    return Err(TableError::InvalidData(
                        "expected an array of objects".to_string(),
                    ));
                };
                let columns: Vec<String> = first.keys().cloned().collect();
                let mut rows = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let obj = item.as_object().ok_or_else(|| {
                        TableError::InvalidData(format!("row {} is not an object", i))
                    })?;
                    if obj.len() != columns.len() {
                        return Err(TableError::RowLength {
                            row: i,
                            expected: columns.len(),
                            found: obj.len(),
                        });
                    }
                    let row = columns
                        .iter()
                        .map(|c| {
                            obj.get(c).map(json_cell).ok_or_else(|| {
                                TableError::InvalidData(format!("row {} lacks key '{}'", i, c))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    rows.push(row);
                }
                Self::new(columns, rows)
            }
            Value::Object(obj) => {
                let columns = obj
                    .get("columns")
                    .and_then(Value::as_array)
                    .ok_or_else(|| TableError::InvalidData("missing 'columns' array".into()))?
                    .iter()
                    .map(|c| match c {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                let rows = obj
                    .get("rows")
                    .and_then(Value::as_array)
                    .ok_or_else(|| TableError::InvalidData("missing 'rows' array".into()))?
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        r.as_array()
                            .map(|cells| cells.iter().map(json_cell).collect())
                            .ok_or_else(|| {
                                TableError::InvalidData(format!("row {} is not an array", i))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Self::new(columns, rows)
            }
            _ => Err(TableError::InvalidData(
                "expected a JSON array or object".to_string(),
            )),
        }
    }

    /// Reads a JSON dataset from a string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`column_index`](Self::column_index) but an unknown column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Returns a copy without the named columns.
    pub fn without_columns<S: AsRef<str>>(&self, hidden: &[S]) -> Result<Self> {
        let mut drop = Vec::with_capacity(hidden.len());
        for name in hidden {
            drop.push(self.require_column(name.as_ref())?);
        }
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|i| !drop.contains(i))
            .collect();
        Ok(Self {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    /// Keeps rows whose value in `column` equals `value`.
    ///
    /// Numbers compare numerically, so `Int(2)` matches `Float(2.0)`.
    pub fn filter_eq(&self, column: &str, value: &CellValue) -> Result<Self> {
        let idx = self.require_column(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|row| cells_equal(&row[idx], value))
            .cloned()
            .collect();
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Stable sort by one column: numbers first in numeric order, then text,
    /// then missing values.
    pub fn sorted_by(&self, column: &str) -> Result<Self> {
        let idx = self.require_column(column)?;
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| compare_cells(&a[idx], &b[idx]));
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Splits the rows into consecutive datasets of at most `max_rows` rows.
    ///
    /// An empty dataset yields a single empty chunk so callers still get a
    /// header-only table.
    pub fn chunks(&self, max_rows: usize) -> Vec<Self> {
        let max_rows = max_rows.max(1);
        if self.rows.is_empty() {
            return vec![self.clone()];
        }
        self.rows
            .chunks(max_rows)
            .map(|rows| Self {
                columns: self.columns.clone(),
                rows: rows.to_vec(),
            })
            .collect()
    }
}

fn json_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Missing,
        Value::Bool(b) => CellValue::Text(b.to_string()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Missing),
        },
        Value::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

fn cells_equal(a: &CellValue, b: &CellValue) -> bool {
    match (a, b) {
        (CellValue::Missing, CellValue::Missing) => true,
        (CellValue::Text(x), CellValue::Text(y)) => x == y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    fn rank(v: &CellValue) -> u8 {
        match v {
            CellValue::Missing => 2,
            v if v.as_f64().is_some() => 0,
            _ => 1,
        }
    }
    match (rank(a), rank(b)) {
        (0, 0) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (1, 1) => a.display().cmp(&b.display()),
        (ra, rb) => ra.cmp(&rb),
    }
}
