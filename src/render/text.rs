//! Terminal rendering: bar charts and aligned tables.

use std::io::Write;

use super::{RenderError, ResultSink};
use crate::model::Report;
use crate::runner::ReportError;
use crate::table::{ColumnType, ResultTable, Series};

const BAR_WIDTH: usize = 40;
const MAX_CELL_WIDTH: usize = 40;

/// Writes human-readable reports to a terminal or any writer.
pub struct TextSink<W: Write> {
    out: W,
    display_rows: usize,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, display_rows: usize) -> Self {
        Self { out, display_rows }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn heading(&mut self, title: &str) -> Result<(), RenderError> {
        writeln!(self.out, "== {} ==", title)?;
        Ok(())
    }

    fn line(&mut self, text: &str) -> Result<(), RenderError> {
        writeln!(self.out, "{}", text.trim_end())?;
        Ok(())
    }
}

impl<W: Write> ResultSink for TextSink<W> {
    fn render_series(&mut self, report: &Report, series: &Series) -> Result<(), RenderError> {
        self.heading(&report.title)?;
        if series.is_empty() {
            self.line("(no data)")?;
            return self.line("");
        }

        let key_width = series
            .keys()
            .map(|k| k.chars().count().min(MAX_CELL_WIDTH))
            .max()
            .unwrap_or(0);
        let max = series.max_value().unwrap_or(0.0);

        for point in series.points() {
            let bar = "#".repeat(bar_length(point.value, max));
            let key = clip(&point.key, MAX_CELL_WIDTH);
            self.line(&format!(
                "{:<kw$}  {:<bw$}  {}",
                key,
                bar,
                point.value,
                kw = key_width,
                bw = BAR_WIDTH
            ))?;
        }
        self.line("")
    }

    fn render_table(&mut self, report: &Report, table: &ResultTable) -> Result<(), RenderError> {
        self.heading(&report.title)?;
        if table.is_empty() {
            self.line("(no rows)")?;
            return self.line("");
        }

        let shown = table.row_count().min(self.display_rows);
        let cells: Vec<Vec<String>> = table
            .rows()
            .take(shown)
            .map(|row| row.iter().map(|v| clip(&v.to_string(), MAX_CELL_WIDTH)).collect())
            .collect();

        let widths: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let numeric: Vec<bool> = table
            .columns()
            .iter()
            .map(|c| matches!(c.data_type, ColumnType::Integer | ColumnType::Float))
            .collect();

        let header: Vec<String> = table
            .columns()
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c.name, w = *w))
            .collect();
        self.line(&header.join("  "))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.line(&rule.join("  "))?;

        for row in &cells {
            let padded: Vec<String> = row
                .iter()
                .zip(widths.iter().zip(&numeric))
                .map(|(cell, (w, right))| {
                    if *right {
                        format!("{:>w$}", cell, w = *w)
                    } else {
                        format!("{:<w$}", cell, w = *w)
                    }
                })
                .collect();
            self.line(&padded.join("  "))?;
        }

        if shown < table.row_count() {
            self.line(&format!("({} of {} rows shown)", shown, table.row_count()))?;
        }
        self.line("")
    }

    fn render_failure(&mut self, report: &Report, error: &ReportError) -> Result<(), RenderError> {
        self.heading(&report.title)?;
        self.line(&format!("error: {}", error))?;
        self.line("")
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        self.out.flush()?;
        Ok(())
    }
}

fn bar_length(value: f64, max: f64) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / max) * BAR_WIDTH as f64).round() as usize
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width - 1).collect();
    clipped.push('~');
    clipped
}
