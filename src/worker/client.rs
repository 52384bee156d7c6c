//! Async client for communicating with the worker process.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{
    codes, methods, ConnectionParams, ErrorInfo, ExecuteQueryParams, ExecuteQueryResponse,
    RequestEnvelope, ResponseEnvelope,
};

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Async client for the database worker.
///
/// The client spawns the worker as a child process and communicates via
/// NDJSON over stdin/stdout. Each request has a unique ID for correlation
/// with responses, so several requests may be in flight at once.
pub struct WorkerClient {
    /// Writer for sending requests to worker stdin.
    stdin: Arc<Mutex<BufWriter<ChildStdin>>>,

    /// Map of pending request IDs to response channels.
    pending: PendingMap,

    /// Handle to the worker child process; killed on drop.
    _child: Child,

    /// Handle to the background reader task.
    reader_task: tokio::task::JoinHandle<()>,

    /// Request timeout duration.
    timeout: Duration,
}

impl WorkerClient {
    /// Spawn a worker with command-line arguments and a request timeout.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn spawn<P: AsRef<Path>>(
        worker_path: P,
        args: &[String],
        timeout: Duration,
    ) -> WorkerResult<Self> {
        let mut child = Command::new(worker_path.as_ref())
            .args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(WorkerError::WorkerExited);
        };

        let stdin = Arc::new(Mutex::new(BufWriter::new(stdin)));
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let reader_task = Self::spawn_reader_task(stdout, pending.clone());

        debug!(path = %worker_path.as_ref().display(), "worker spawned");

        Ok(Self {
            stdin,
            pending,
            _child: child,
            reader_task,
            timeout,
        })
    }

    /// Spawn the background task that reads responses from the worker.
    fn spawn_reader_task(stdout: ChildStdout, pending: PendingMap) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                        Ok(resp) => {
                            if let Some(tx) = pending.lock().await.remove(&resp.id) {
                                let _ = tx.send(resp);
                            }
                        }
                        Err(e) => warn!(error = %e, "worker: unparseable response line"),
                    },
                    Err(e) => {
                        warn!(error = %e, "worker: read error");
                        break;
                    }
                }
            }

            // Fail every request still waiting on the dead worker.
            let mut pending = pending.lock().await;
            for (id, tx) in pending.drain() {
                let _ = tx.send(ResponseEnvelope {
                    id,
                    success: false,
                    result: None,
                    error: Some(ErrorInfo {
                        code: codes::WORKER_EXITED.to_string(),
                        message: "Worker process exited unexpectedly".to_string(),
                    }),
                });
            }
        })
    }

    /// Send a request to the worker and wait for a response.
    pub async fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();

        let request = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
        };
        let line = serde_json::to_string(&request).map_err(WorkerError::SerializeFailed)? + "\n";

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        if let Err(e) = self.send_line(&line).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(received) => received?,
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(WorkerError::Timeout(self.timeout.as_secs()));
            }
        };

        if response.success {
            let result = response.result.unwrap_or(serde_json::Value::Null);
            serde_json::from_value(result).map_err(WorkerError::DeserializeFailed)
        } else {
            let error = response.error.unwrap_or_else(|| ErrorInfo {
                code: "UNKNOWN".to_string(),
                message: "Unknown error".to_string(),
            });
            Err(Self::classify_error(&error.code, &error.message))
        }
    }

    async fn send_line(&self, line: &str) -> WorkerResult<()> {
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(WorkerError::WriteFailed)?;
        stdin.flush().await.map_err(WorkerError::WriteFailed)
    }

    /// Classify a worker error code into a more specific error type.
    fn classify_error(code: &str, message: &str) -> WorkerError {
        match code {
            codes::DRIVER_NOT_FOUND => WorkerError::DriverNotFound(message.to_string()),
            codes::CONNECTION_FAILED => WorkerError::ConnectionFailed(message.to_string()),
            codes::WORKER_EXITED => WorkerError::WorkerExited,
            _ => WorkerError::remote(code, message),
        }
    }

    /// Whether the worker process is still running.
    pub fn is_alive(&self) -> bool {
        !self.reader_task.is_finished()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute a SQL query.
    pub async fn execute_query(
        &self,
        connection: &ConnectionParams,
        sql: &str,
    ) -> WorkerResult<ExecuteQueryResponse> {
        self.request(
            methods::EXECUTE_QUERY,
            ExecuteQueryParams {
                connection: connection.clone(),
                sql: sql.to_string(),
            },
        )
        .await
    }
}
