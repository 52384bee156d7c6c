//! Out-of-process database worker.
//!
//! Warehouse drivers live in a separate worker binary. The dashboard talks to
//! it over NDJSON on stdin/stdout: one request envelope per line, answered by
//! one response envelope carrying the same id.
//!
//! ```text
//!   yelp-insights ──(stdin)──▶ {"id":"…","method":"query.execute","params":{…}}
//!                 ◀─(stdout)── {"id":"…","success":true,"result":{columns,rows,…}}
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};
