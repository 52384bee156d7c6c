//! JSON rendering: one document holding every report.

use std::io::Write;

use serde_json::{json, Value as Json};

use super::{RenderError, ResultSink};
use crate::model::Report;
use crate::runner::{RenderableResult, ReportError};
use crate::table::{ResultTable, Series};

/// JSON object describing one report's outcome.
///
/// Successful reports carry a `series` or `table` payload; failed ones carry
/// `error` and `error_kind`.
pub fn report_entry(
    report: &Report,
    result: &Result<RenderableResult, ReportError>,
) -> Result<Json, serde_json::Error> {
    let mut entry = json!({
        "id": report.id,
        "title": report.title,
        "kind": report.kind.to_string(),
    });
    match result {
        Ok(RenderableResult::Series(series)) => {
            entry["status"] = json!("ok");
            entry["series"] = serde_json::to_value(series)?;
        }
        Ok(RenderableResult::Table(table)) => {
            entry["status"] = json!("ok");
            entry["table"] = serde_json::to_value(table)?;
        }
        Err(e) => {
            entry["status"] = json!("error");
            entry["error_kind"] = json!(e.kind());
            entry["error"] = json!(e.to_string());
        }
    }
    Ok(entry)
}

/// Collects report entries and writes them as one document on finish.
pub struct JsonSink<W: Write> {
    out: W,
    title: String,
    reports: Vec<Json>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W, title: impl Into<String>) -> Self {
        Self {
            out,
            title: title.into(),
            reports: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn render_series(&mut self, report: &Report, series: &Series) -> Result<(), RenderError> {
        self.reports.push(report_entry(
            report,
            &Ok(RenderableResult::Series(series.clone())),
        )?);
        Ok(())
    }

    fn render_table(&mut self, report: &Report, table: &ResultTable) -> Result<(), RenderError> {
        self.reports.push(report_entry(
            report,
            &Ok(RenderableResult::Table(table.clone())),
        )?);
        Ok(())
    }

    fn render_failure(&mut self, report: &Report, error: &ReportError) -> Result<(), RenderError> {
        self.reports.push(report_entry(report, &Err(error.clone()))?);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        let document = json!({
            "title": self.title,
            "reports": std::mem::take(&mut self.reports),
        });
        serde_json::to_writer_pretty(&mut self.out, &document)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
