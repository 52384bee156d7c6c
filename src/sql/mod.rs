//! SQL support for report definitions.
//!
//! - [`dialect`] - per-store rendering of the fragments report SQL needs
//! - [`projection`] - static extraction of a query's output column names

pub mod dialect;
pub mod projection;

pub use dialect::{Dialect, ListSplit, SqlDialect, TopPerGroup};
pub use projection::output_columns;
