// src/model/report.rs
use serde::{Deserialize, Serialize};

use crate::sql::{output_columns, Dialect};

/// Errors in report definitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    #[error("report id must not be empty")]
    EmptyId,

    #[error("duplicate report id: {0}")]
    DuplicateId(String),

    #[error("report '{0}' has no SQL")]
    EmptySql(String),

    #[error("series report '{report}' does not declare its {role} column")]
    MissingSeriesColumn { report: String, role: &'static str },

    #[error("report '{report}' references column '{column}' not produced by its SQL (produces: {})", .available.join(", "))]
    UnknownColumn {
        report: String,
        column: String,
        available: Vec<String>,
    },

    #[error("invalid table name: '{0}'")]
    InvalidTableName(String),

    #[error("unknown report id: {0}")]
    UnknownReport(String),
}

/// How a report's result is shaped for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// Category → value mapping, rendered as a bar chart.
    Series,
    /// Generic row table.
    Table,
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultKind::Series => f.pad("series"),
            ResultKind::Table => f.pad("table"),
        }
    }
}

/// A report definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub sql: String,
    pub kind: ResultKind,
    /// Category column (series reports).
    pub index_column: Option<String>,
    /// Numeric column (series reports).
    pub value_column: Option<String>,
    /// Row cap applied to table results after execution.
    pub row_limit: Option<usize>,
}

impl Report {
    /// A chart report keyed by `index` with values from `value`.
    pub fn series(
        id: impl Into<String>,
        title: impl Into<String>,
        sql: impl Into<String>,
        index: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sql: sql.into(),
            kind: ResultKind::Series,
            index_column: Some(index.into()),
            value_column: Some(value.into()),
            row_limit: None,
        }
    }

    /// A table report.
    pub fn table(id: impl Into<String>, title: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sql: sql.into(),
            kind: ResultKind::Table,
            index_column: None,
            value_column: None,
            row_limit: None,
        }
    }

    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = Some(limit);
        self
    }

    /// Columns this report requires its SQL to return.
    pub fn referenced_columns(&self) -> Vec<&str> {
        self.index_column
            .iter()
            .chain(self.value_column.iter())
            .map(String::as_str)
            .collect()
    }

    /// Index and value column of a series report.
    pub fn series_columns(&self) -> Result<(&str, &str), DefinitionError> {
        let index = self
            .index_column
            .as_deref()
            .ok_or_else(|| self.missing_series_column("index"))?;
        let value = self
            .value_column
            .as_deref()
            .ok_or_else(|| self.missing_series_column("value"))?;
        Ok((index, value))
    }

    /// Check the definition on its own.
    ///
    /// When the SQL's output columns can be read statically for `dialect`,
    /// referenced columns are checked against them; otherwise that check is
    /// left to [`Report::check_columns`] at run time.
    pub fn validate(&self, dialect: Dialect) -> Result<(), DefinitionError> {
        if self.id.trim().is_empty() {
            return Err(DefinitionError::EmptyId);
        }
        if self.sql.trim().is_empty() {
            return Err(DefinitionError::EmptySql(self.id.clone()));
        }
        if self.kind == ResultKind::Series {
            self.series_columns()?;
        }

        if let Some(columns) = output_columns(&self.sql, dialect) {
            let produced: Vec<&str> = columns.iter().map(String::as_str).collect();
            self.check_columns(&produced)?;
        }
        Ok(())
    }

    /// Check referenced columns against the names a query actually produced.
    ///
    /// Names compare ignoring ASCII case, matching result-table lookup.
    pub fn check_columns(&self, produced: &[&str]) -> Result<(), DefinitionError> {
        for column in self.referenced_columns() {
            if !produced.iter().any(|p| p.eq_ignore_ascii_case(column)) {
                return Err(DefinitionError::UnknownColumn {
                    report: self.id.clone(),
                    column: column.to_string(),
                    available: produced.iter().map(|s| s.to_string()).collect(),
                });
            }
        }
        Ok(())
    }

    fn missing_series_column(&self, role: &'static str) -> DefinitionError {
        DefinitionError::MissingSeriesColumn {
            report: self.id.clone(),
            role,
        }
    }
}
