//! # yelp-insights
//!
//! An analytics dashboard over a Yelp-derived dataset: ten fixed, parameter-free
//! reports over a `businesses` and a `reviews` table, each rendered as a bar
//! chart or a table.
//!
//! ## Architecture
//!
//! ```text
//!  ReportCatalog ──(per report)──▶ ReportRunner ──▶ ResultSink
//!   (SQL + shape)                    │    ▲          (text, json, web)
//!                             execute │    │ ResultTable
//!                                     ▼    │
//!                                  DataSource
//!                          (SQLite in-process, or the
//!                           warehouse through the worker)
//! ```
//!
//! Reports are data: a title, SQL rendered for the source's [`sql::Dialect`],
//! and the shape of the result. One generic [`runner::ReportRunner`] executes
//! them in catalog order. A failing report is reported and skipped; it never
//! stops the rest of the run.

pub mod catalog;
pub mod config;
pub mod model;
pub mod render;
pub mod runner;
pub mod source;
pub mod sql;
pub mod table;
pub mod worker;

#[cfg(feature = "ui")]
pub mod web;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{ReportCatalog, TableNames};
    pub use crate::model::{DefinitionError, Report, ResultKind};
    pub use crate::render::{JsonSink, ResultSink, TextSink};
    pub use crate::runner::{RenderableResult, ReportError, ReportRunner, RunSummary};
    pub use crate::source::{DataSource, SourceError, SqliteSource};
    pub use crate::sql::Dialect;
    pub use crate::table::{ResultTable, Series, Value};
}

pub use catalog::ReportCatalog;
pub use runner::ReportRunner;
pub use sql::Dialect;
