//! Typed tabular query results.
//!
//! A [`ResultTable`] is an ordered set of named columns where every column
//! holds values of a single inferred [`ColumnType`]. Tables are built from the
//! row-oriented output of a data source; [`Series`] is the category → number
//! view used by chart reports.

mod series;
mod value;

pub use series::{ReshapeError, Series, SeriesPoint};
pub use value::{ColumnType, Value};

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Errors raised while assembling a table from raw rows.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TableError {
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A named column with values of one type.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
    pub values: Vec<Value>,
}

/// A query result: ordered named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl ResultTable {
    /// Build a table from column names and row-major values.
    ///
    /// Column types are inferred from the non-null values: integer and float
    /// columns widen to float, text columns holding only ISO dates become
    /// dates, and any other mix falls back to text.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, TableError> {
        let width = names.len();
        let row_count = rows.len();
        let mut buckets: Vec<Vec<Value>> = (0..width).map(|_| Vec::with_capacity(row_count)).collect();

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(TableError::RaggedRow {
                    row: i,
                    expected: width,
                    found: row.len(),
                });
            }
            for (bucket, value) in buckets.iter_mut().zip(row) {
                bucket.push(value);
            }
        }

        let columns = names
            .into_iter()
            .zip(buckets)
            .map(|(name, values)| infer_column(name, values))
            .collect();

        Ok(Self { columns, row_count })
    }

    /// An empty table with the given column names.
    pub fn empty(names: Vec<String>) -> Self {
        let columns = names
            .into_iter()
            .map(|name| Column {
                name,
                data_type: ColumnType::Null,
                values: Vec::new(),
            })
            .collect();
        Self {
            columns,
            row_count: 0,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name.
    ///
    /// An exact match wins; otherwise names are compared ignoring ASCII case,
    /// since warehouses such as Snowflake upper-case unquoted aliases.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Values of row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// Keep at most `limit` rows.
    pub fn truncate(&mut self, limit: usize) {
        if limit >= self.row_count {
            return;
        }
        for column in &mut self.columns {
            column.values.truncate(limit);
        }
        self.row_count = limit;
    }
}

impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct ColumnHeader<'a> {
            name: &'a str,
            #[serde(rename = "type")]
            data_type: ColumnType,
        }

        let headers: Vec<ColumnHeader<'_>> = self
            .columns
            .iter()
            .map(|c| ColumnHeader {
                name: &c.name,
                data_type: c.data_type,
            })
            .collect();
        let rows: Vec<Vec<&Value>> = self.rows().collect();

        let mut state = serializer.serialize_struct("ResultTable", 2)?;
        state.serialize_field("columns", &headers)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

fn infer_column(name: String, values: Vec<Value>) -> Column {
    let mut seen: Option<ColumnType> = None;
    let mut mixed = false;
    for ty in values.iter().filter_map(Value::column_type) {
        seen = match (seen, ty) {
            (None, t) => Some(t),
            (Some(a), b) if a == b => Some(a),
            (Some(ColumnType::Integer), ColumnType::Float)
            | (Some(ColumnType::Float), ColumnType::Integer) => Some(ColumnType::Float),
            (Some(_), _) => {
                mixed = true;
                Some(ColumnType::Text)
            }
        };
    }

    let data_type = match seen {
        None => ColumnType::Null,
        Some(_) if mixed => ColumnType::Text,
        Some(ColumnType::Text) if all_dates(&values) => ColumnType::Date,
        Some(t) => t,
    };

    let values = values
        .into_iter()
        .map(|v| coerce(v, data_type))
        .collect();

    Column {
        name,
        data_type,
        values,
    }
}

fn all_dates(values: &[Value]) -> bool {
    values
        .iter()
        .filter(|v| !v.is_null())
        .all(|v| v.as_str().and_then(Value::parse_date).is_some())
}

fn coerce(value: Value, target: ColumnType) -> Value {
    match (value, target) {
        (Value::Null, _) => Value::Null,
        (Value::Integer(i), ColumnType::Float) => Value::Float(i as f64),
        (Value::Text(s), ColumnType::Date) => match Value::parse_date(&s) {
            Some(d) => Value::Date(d),
            None => Value::Text(s),
        },
        (v @ Value::Text(_), ColumnType::Text) => v,
        (v, ColumnType::Text) => Value::Text(v.to_string()),
        (v, _) => v,
    }
}
