//! Bar chart requests for a numeric column.
//!
//! The pipeline never draws anything itself: it builds a [`BarChart`]
//! (one bar per row position) and hands it to a [`ChartRenderer`].
//! The HTTP API returns the chart as JSON for the browser to draw,
//! the CLI prints it with [`TextChartRenderer`].

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::TableError;
use crate::models::Table;

/// Warning returned when a table has nothing to plot.
pub const NO_NUMERIC_COLUMNS: &str = "No numeric columns available for visualization";

/// One bar: row position and value (`None` for a missing cell).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub position: usize,
    pub value: Option<f64>,
}

/// A bar chart of one column against row position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    pub column: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Smallest and largest present value.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bars.iter().filter_map(|b| b.value).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Outcome of the visualization step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Visualization {
    /// A chart to render.
    Chart { chart: BarChart },
    /// Nothing to plot; the step was skipped.
    Skipped { warning: String },
}

/// Build the chart request for `column`, or for the first numeric column.
///
/// A table without numeric columns yields [`Visualization::Skipped`].
/// Asking for a column that is missing or not numeric is an error.
pub fn visualize(table: &Table, column: Option<&str>) -> Result<Visualization, TableError> {
    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        return Ok(Visualization::Skipped {
            warning: NO_NUMERIC_COLUMNS.to_string(),
        });
    }

    let name = match column {
        Some(name) => name,
        None => numeric[0].as_str(),
    };

    let source = table
        .column(name)
        .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
    if !source.kind.is_numeric() {
        return Err(TableError::ColumnNotNumeric(name.to_string()));
    }

    let bars = source
        .values
        .iter()
        .enumerate()
        .map(|(position, value)| Bar {
            position,
            value: value.as_f64(),
        })
        .collect();

    Ok(Visualization::Chart {
        chart: BarChart {
            column: name.to_string(),
            bars,
        },
    })
}

/// Something that can draw a bar chart.
///
/// Rendering is fire-and-forget: callers do not consume a result.
pub trait ChartRenderer {
    fn render_bar_chart(&mut self, chart: &BarChart);
}

/// Draws horizontal text bars, one line per row.
pub struct TextChartRenderer<W: Write> {
    out: W,
    width: usize,
    max_rows: usize,
}

impl<W: Write> TextChartRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: 40,
            max_rows: 50,
        }
    }

    /// Set the width of the longest bar, in characters
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    /// Set how many rows are drawn before truncating
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, chart: &BarChart) -> std::io::Result<()> {
        writeln!(self.out, "📊 {}", chart.column)?;

        let scale = chart
            .bounds()
            .map(|(lo, hi)| lo.abs().max(hi.abs()))
            .filter(|s| *s > 0.0 && s.is_finite());

        for bar in chart.bars.iter().take(self.max_rows) {
            match bar.value {
                None => writeln!(self.out, "{:>5} | (missing)", bar.position)?,
                Some(value) => {
                    let length = scale
                        .map(|s| ((value.abs() / s) * self.width as f64).round() as usize)
                        .unwrap_or(0)
                        .min(self.width);
                    let symbol = if value < 0.0 { "-" } else { "#" };
                    writeln!(
                        self.out,
                        "{:>5} | {} {}",
                        bar.position,
                        symbol.repeat(length),
                        crate::models::Value::Float(value)
                    )?;
                }
            }
        }

        if chart.bars.len() > self.max_rows {
            writeln!(self.out, "      ... {} more rows", chart.bars.len() - self.max_rows)?;
        }
        Ok(())
    }
}

impl<W: Write> ChartRenderer for TextChartRenderer<W> {
    fn render_bar_chart(&mut self, chart: &BarChart) {
        if let Err(e) = self.draw(chart) {
            tracing::warn!("Failed to draw chart for '{}': {}", chart.column, e);
        }
    }
}
