//! Warehouse source backed by the database worker.

use std::path::Path;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use super::{DataSource, SourceError};
use crate::config::{ConnectionConfig, WorkerSettings};
use crate::sql::Dialect;
use crate::table::{ResultTable, Value};
use crate::worker::protocol::{ConnectionParams, ExecuteQueryResponse};
use crate::worker::{WorkerClient, WorkerError};

/// Executes SQL through a long-running worker process.
///
/// The worker speaks async NDJSON; this type owns a private single-threaded
/// runtime and blocks on each request, so callers see a synchronous source.
/// Must not be used from inside another tokio runtime's async context.
pub struct WorkerSource {
    runtime: Runtime,
    client: WorkerClient,
    connection: ConnectionParams,
    dialect: Dialect,
    label: String,
}

impl WorkerSource {
    /// Spawn the worker at `worker_path` for the given connection.
    pub fn spawn(
        config: &ConnectionConfig,
        worker_path: &Path,
        settings: &WorkerSettings,
    ) -> Result<Self, SourceError> {
        Self::launch(config, worker_path, &settings.pool.to_worker_args(), settings.timeout())
    }

    fn launch(
        config: &ConnectionConfig,
        worker_path: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SourceError::Connection(format!("failed to start runtime: {}", e)))?;

        let client = runtime.block_on(WorkerClient::spawn(worker_path, args, timeout))?;
        debug!(
            worker = %worker_path.display(),
            timeout_secs = client.timeout().as_secs(),
            "worker source ready"
        );

        Ok(Self {
            runtime,
            client,
            connection: ConnectionParams {
                driver: config.driver_name().to_string(),
                connection_string: config.connection_string.clone(),
            },
            dialect: config.driver.dialect(),
            label: format!("{}:{}", config.driver_name(), config.redacted()),
        })
    }
}

impl DataSource for WorkerSource {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn execute(&self, sql: &str) -> Result<ResultTable, SourceError> {
        if !self.client.is_alive() {
            return Err(WorkerError::WorkerExited.into());
        }
        let response = self
            .runtime
            .block_on(self.client.execute_query(&self.connection, sql))?;
        debug!(rows = response.row_count, "worker query finished");
        into_table(response)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

impl From<WorkerError> for SourceError {
    fn from(err: WorkerError) -> Self {
        if err.is_connection_failure() {
            SourceError::Connection(err.to_string())
        } else {
            SourceError::Query(err.to_string())
        }
    }
}

/// Warehouse type names whose values may arrive as JSON strings.
fn is_numeric_type(data_type: &str) -> bool {
    let upper = data_type.to_ascii_uppercase();
    ["NUMBER", "DECIMAL", "NUMERIC", "FIXED", "INT", "FLOAT", "DOUBLE", "REAL"]
        .iter()
        .any(|t| upper.starts_with(t))
}

fn into_table(response: ExecuteQueryResponse) -> Result<ResultTable, SourceError> {
    let numeric: Vec<bool> = response
        .columns
        .iter()
        .map(|c| is_numeric_type(&c.data_type))
        .collect();
    let names = response.columns.into_iter().map(|c| c.name).collect();

    let rows = response
        .rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(i, cell)| {
                    let value = Value::from(cell);
                    match value {
                        Value::Text(s) if numeric.get(i).copied().unwrap_or(false) => {
                            parse_number(&s).unwrap_or(Value::Text(s))
                        }
                        other => other,
                    }
                })
                .collect()
        })
        .collect();

    Ok(ResultTable::from_rows(names, rows)?)
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Integer(i));
    }
    s.parse::<f64>().ok().map(Value::Float)
}
