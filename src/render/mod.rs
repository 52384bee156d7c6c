//! Result sinks: where rendered reports go.

mod json;
mod text;

pub use json::{report_entry, JsonSink};
pub use text::TextSink;

use crate::model::Report;
use crate::runner::ReportError;
use crate::table::{ResultTable, Series};

/// Failure writing rendered output.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Consumer of report results, called once per report in catalog order.
pub trait ResultSink {
    fn render_series(&mut self, report: &Report, series: &Series) -> Result<(), RenderError>;

    fn render_table(&mut self, report: &Report, table: &ResultTable) -> Result<(), RenderError>;

    /// A report that could not be produced. Ignored by default.
    fn render_failure(&mut self, _report: &Report, _error: &ReportError) -> Result<(), RenderError> {
        Ok(())
    }

    /// Called once after the last report.
    fn finish(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}
