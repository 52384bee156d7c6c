//! Web dashboard.
//!
//! Serves a single page plus a JSON API over the report catalog.

mod server;

pub use server::{router, serve, AppState};
