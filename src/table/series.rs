//! Category → value series for chart reports.

use std::collections::HashSet;

use serde::Serialize;

use super::{ResultTable, Value};

/// Errors raised when a result table cannot be reshaped into a series.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReshapeError {
    #[error("column '{column}' not found in result (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("duplicate index value '{key}' in column '{column}'")]
    DuplicateKey { column: String, key: String },

    #[error("null index value in column '{column}' at row {row}")]
    NullKey { column: String, row: usize },

    #[error("non-numeric value '{value}' in column '{column}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

/// One bar of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub key: String,
    pub value: f64,
}

/// An ordered category → value mapping with unique keys.
///
/// Point order is the row order of the source table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub index: String,
    pub value: String,
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Reshape `table` into a series keyed by `index` with values from `value`.
    ///
    /// Duplicate keys are rejected rather than merged.
    pub fn from_table(table: &ResultTable, index: &str, value: &str) -> Result<Self, ReshapeError> {
        let missing = |column: &str| ReshapeError::MissingColumn {
            column: column.to_string(),
            available: table.column_names().iter().map(|s| s.to_string()).collect(),
        };
        let keys = table.column(index).ok_or_else(|| missing(index))?;
        let values = table.column(value).ok_or_else(|| missing(value))?;

        let mut seen = HashSet::with_capacity(table.row_count());
        let mut points = Vec::with_capacity(table.row_count());

        for (row, (key, val)) in keys.values.iter().zip(&values.values).enumerate() {
            if key.is_null() {
                return Err(ReshapeError::NullKey {
                    column: keys.name.clone(),
                    row,
                });
            }
            let key = key.to_string();
            if !seen.insert(key.clone()) {
                return Err(ReshapeError::DuplicateKey {
                    column: keys.name.clone(),
                    key,
                });
            }
            let number = val.as_f64().ok_or_else(|| ReshapeError::NonNumeric {
                column: values.name.clone(),
                row,
                value: describe(val),
            })?;
            points.push(SeriesPoint { key, value: number });
        }

        Ok(Self {
            index: keys.name.clone(),
            value: values.name.clone(),
            points,
        })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.points.iter().find(|p| p.key == key).map(|p| p.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.key.as_str())
    }

    /// Largest value, used to scale bars.
    pub fn max_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::max)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}
