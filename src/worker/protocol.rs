//! Wire types for the worker's NDJSON protocol.

use serde::{Deserialize, Serialize};

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "query.execute").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

/// Database connection parameters, flattened into every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Database driver name (e.g., "snowflake").
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
}

/// Parameters for `query.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueryParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    pub sql: String,
}

/// Column information in query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultColumn {
    /// Column name or alias.
    pub name: String,
    /// Database-specific type.
    #[serde(default)]
    pub data_type: String,
}

/// Response from `query.execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteQueryResponse {
    pub columns: Vec<QueryResultColumn>,
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows returned.
    #[serde(default)]
    pub row_count: i64,
}

/// Worker method names.
pub mod methods {
    pub const EXECUTE_QUERY: &str = "query.execute";
}

/// Error codes the worker reports when it cannot reach the database.
pub mod codes {
    pub const CONNECTION_FAILED: &str = "CONNECTION_FAILED";
    pub const DRIVER_NOT_FOUND: &str = "DRIVER_NOT_FOUND";
    pub const WORKER_EXITED: &str = "WORKER_EXITED";
}
