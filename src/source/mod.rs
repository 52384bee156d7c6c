//! Data sources: where report SQL is executed.
//!
//! A [`DataSource`] executes SQL text and returns a [`ResultTable`]. Two
//! backends exist:
//!
//! - [`SqliteSource`]: an in-process SQLite database (local files, tests)
//! - [`WorkerSource`]: a warehouse reached through the database worker
//!
//! Sources are passed explicitly to the runner; nothing here is global.

mod sqlite;
mod worker;

pub use sqlite::{SqliteSource, YELP_SCHEMA_DDL};
pub use worker::WorkerSource;

use crate::config::{ConnectionConfig, Driver, Settings};
use crate::sql::Dialect;
use crate::table::{ResultTable, TableError};

/// Failure executing SQL against a source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    /// Transport or authentication failure. Not retried.
    #[error("connection error: {0}")]
    Connection(String),

    /// Malformed SQL or a failure inside the database, such as a missing table.
    #[error("query error: {0}")]
    Query(String),
}

impl SourceError {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<TableError> for SourceError {
    fn from(err: TableError) -> Self {
        Self::Query(err.to_string())
    }
}

/// A relational store that executes read-only SQL.
pub trait DataSource {
    /// SQL dialect the store speaks.
    fn dialect(&self) -> Dialect;

    /// Execute one statement and collect its full result.
    fn execute(&self, sql: &str) -> Result<ResultTable, SourceError>;

    /// Short human-readable description for logs, with credentials masked.
    fn describe(&self) -> String;
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn execute(&self, sql: &str) -> Result<ResultTable, SourceError> {
        (**self).execute(sql)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Open the backend matching the connection's driver.
pub fn open(
    config: &ConnectionConfig,
    settings: &Settings,
) -> Result<Box<dyn DataSource + Send>, SourceError> {
    tracing::debug!(driver = config.driver_name(), location = %config.redacted(), "opening data source");
    match config.driver {
        Driver::Sqlite => Ok(Box::new(SqliteSource::open(&config.connection_string)?)),
        Driver::Snowflake => {
            let path = settings.worker_path().ok_or_else(|| {
                SourceError::Connection(crate::worker::WorkerError::NotFound.to_string())
            })?;
            Ok(Box::new(WorkerSource::spawn(config, &path, &settings.worker)?))
        }
    }
}
