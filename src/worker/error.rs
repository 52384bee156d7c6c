//! Worker-specific error types.

use std::io;
use thiserror::Error;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur during worker communication.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker binary could not be located.
    #[error("worker binary not found; set worker.path in the config file")]
    NotFound,

    /// Failed to spawn the worker process.
    #[error("failed to spawn worker process: {0}")]
    SpawnFailed(#[source] io::Error),

    /// Failed to write to worker stdin.
    #[error("failed to write to worker: {0}")]
    WriteFailed(#[source] io::Error),

    /// Failed to serialize request to JSON.
    #[error("failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// Failed to deserialize response from JSON.
    #[error("failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// Request timed out waiting for response.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Worker process exited unexpectedly.
    #[error("worker process exited unexpectedly")]
    WorkerExited,

    /// Response channel was closed (internal error).
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    /// Worker returned an error response.
    #[error("worker error: {message} (code: {code})")]
    Remote {
        /// Error code from worker.
        code: String,
        /// Error message from worker.
        message: String,
    },

    /// Database driver not found.
    #[error("database driver not found: {0}")]
    DriverNotFound(String),

    /// Database connection failed.
    #[error("database connection failed: {0}")]
    ConnectionFailed(String),
}

impl WorkerError {
    /// Create a remote error from an error response.
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether the failure lies in reaching the database rather than in the
    /// statement sent to it.
    pub fn is_connection_failure(&self) -> bool {
        !matches!(
            self,
            Self::Remote { .. } | Self::DeserializeFailed(_) | Self::SerializeFailed(_)
        )
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for WorkerError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelClosed
    }
}
