//! Report execution.
//!
//! [`ReportRunner`] sends each report's SQL to a [`DataSource`], reshapes the
//! result per the report's kind and hands it to a [`ResultSink`]. Reports are
//! isolated from each other: a failing report is rendered as a failure and
//! the run moves on to the next one.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::catalog::ReportCatalog;
use crate::model::{DefinitionError, Report, ResultKind};
use crate::render::{RenderError, ResultSink};
use crate::source::{DataSource, SourceError};
use crate::table::{ReshapeError, ResultTable, Series};

/// Why a single report failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("reshape error: {0}")]
    Reshape(#[from] ReshapeError),

    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),
}

impl ReportError {
    /// Stable lowercase name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Connection(_) => "connection",
            ReportError::Query(_) => "query",
            ReportError::Reshape(_) => "reshape",
            ReportError::Definition(_) => "definition",
        }
    }
}

impl From<SourceError> for ReportError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Connection(msg) => ReportError::Connection(msg),
            SourceError::Query(msg) => ReportError::Query(msg),
        }
    }
}

/// A report result in the shape its sink expects.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderableResult {
    Series(Series),
    Table(ResultTable),
}

impl RenderableResult {
    pub fn kind(&self) -> ResultKind {
        match self {
            RenderableResult::Series(_) => ResultKind::Series,
            RenderableResult::Table(_) => ResultKind::Table,
        }
    }

    /// Bars in a series, rows in a table.
    pub fn len(&self) -> usize {
        match self {
            RenderableResult::Series(s) => s.len(),
            RenderableResult::Table(t) => t.row_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one report within a run.
#[derive(Debug)]
pub struct RunEntry {
    pub report: String,
    /// Result size on success.
    pub outcome: Result<usize, ReportError>,
    pub elapsed: Duration,
}

/// Per-report outcomes of a full run, in catalog order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub entries: Vec<RunEntry>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &ReportError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (e.report.as_str(), err)))
    }

    pub fn is_success(&self) -> bool {
        self.entries.iter().all(|e| e.outcome.is_ok())
    }
}

/// Executes reports against one data source.
pub struct ReportRunner<'a> {
    source: &'a dyn DataSource,
}

impl<'a> ReportRunner<'a> {
    pub fn new(source: &'a dyn DataSource) -> Self {
        Self { source }
    }

    /// Execute one report and reshape its result.
    ///
    /// Series reports are keyed by their index column; duplicate, null or
    /// missing keys fail with [`ReshapeError`]. Table reports pass through,
    /// cut to `row_limit` when one is set. Nothing is cached between calls.
    pub fn run(&self, report: &Report) -> Result<RenderableResult, ReportError> {
        debug!(report = %report.id, sql = %report.sql, "executing report");
        let mut table = self.source.execute(&report.sql)?;

        match report.kind {
            ResultKind::Series => {
                let (index, value) = report.series_columns()?;
                let series = Series::from_table(&table, index, value)?;
                Ok(RenderableResult::Series(series))
            }
            ResultKind::Table => {
                if let Some(limit) = report.row_limit {
                    if table.row_count() > limit {
                        debug!(
                            report = %report.id,
                            rows = table.row_count(),
                            limit,
                            "truncating result"
                        );
                        table.truncate(limit);
                    }
                }
                Ok(RenderableResult::Table(table))
            }
        }
    }

    /// Run every report in catalog order, rendering each as it completes.
    ///
    /// Report failures are rendered and recorded, never propagated. Only a
    /// failing sink aborts the run.
    pub fn run_all(
        &self,
        catalog: &ReportCatalog,
        sink: &mut dyn ResultSink,
    ) -> Result<RunSummary, RenderError> {
        info!(
            reports = catalog.len(),
            source = %self.source.describe(),
            "running dashboard"
        );
        let mut summary = RunSummary::default();

        for report in catalog.list() {
            let started = Instant::now();
            let result = self.run(report);
            let elapsed = started.elapsed();

            let outcome = match &result {
                Ok(rendered) => {
                    info!(
                        report = %report.id,
                        rows = rendered.len(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "report finished"
                    );
                    Ok(rendered.len())
                }
                Err(e) => {
                    warn!(report = %report.id, kind = e.kind(), error = %e, "report failed");
                    Err(e.clone())
                }
            };

            match result {
                Ok(RenderableResult::Series(series)) => sink.render_series(report, &series)?,
                Ok(RenderableResult::Table(table)) => sink.render_table(report, &table)?,
                Err(e) => sink.render_failure(report, &e)?,
            }

            summary.entries.push(RunEntry {
                report: report.id.clone(),
                outcome,
                elapsed,
            });
        }

        sink.finish()?;
        info!(
            succeeded = summary.succeeded(),
            failed = summary.entries.len() - summary.succeeded(),
            "dashboard complete"
        );
        Ok(summary)
    }
}
