// =============================================================================
// Chart Rendering
// =============================================================================
//
// Writes chart artifacts for a finished series:
// - `{stem}_price_chart.html` — interactive close + moving average
// - `{stem}_price_chart.svg`  — static close + moving average
// - `{stem}_rsi_chart.svg`    — RSI with 30 / 70 guides
// - `{stem}_macd_chart.svg`   — MACD, signal, and histogram
//
// `stem` defaults to `{ticker}_{period}` (or `{ticker}_{start}_{end}`).

pub mod html;
pub mod svg;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::indicators::{macd_histogram, MACD, MACD_SIGNAL, MOVING_AVERAGE, RSI};
use crate::market_data::PriceSeries;
use self::svg::{Line, LineChart};

/// Which chart a file holds; used in the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Price,
    Rsi,
    Macd,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{stem}_{kind}_chart.{ext}`
pub fn chart_file_name(stem: &str, kind: ChartKind, ext: &str) -> String {
    format!("{stem}_{kind}_chart.{ext}")
}

/// Input handed to a renderer.
#[derive(Debug, Clone, Copy)]
pub struct ChartJob<'a> {
    pub ticker: &'a str,
    pub series: &'a PriceSeries,
    pub out_dir: &'a Path,
    pub stem: &'a str,
}

/// Produces chart artifacts and reports the files it wrote.
pub trait ChartRenderer {
    fn render(&self, job: &ChartJob<'_>) -> Result<Vec<PathBuf>>;
}

impl<T: ChartRenderer + ?Sized> ChartRenderer for &T {
    fn render(&self, job: &ChartJob<'_>) -> Result<Vec<PathBuf>> {
        (**self).render(job)
    }
}

/// Writes HTML and/or SVG charts to disk.
#[derive(Debug, Clone, Copy)]
pub struct FileChartRenderer {
    pub html: bool,
    pub static_images: bool,
}

impl Default for FileChartRenderer {
    fn default() -> Self {
        Self {
            html: true,
            static_images: true,
        }
    }
}

impl ChartRenderer for FileChartRenderer {
    fn render(&self, job: &ChartJob<'_>) -> Result<Vec<PathBuf>> {
        let series = job.series;
        let dates = series.dates();
        let closes = series.closes();
        let ma = column_or_undefined(series, MOVING_AVERAGE);

        let mut written = Vec::new();

        if self.html {
            let page = html::render_price_page(
                &format!("{} price over time", job.ticker),
                &dates,
                &closes,
                "Moving Average",
                &ma,
            );
            let path = job.out_dir.join(chart_file_name(job.stem, ChartKind::Price, "html"));
            write_artifact(&path, &page)?;
            written.push(path);
        }

        if self.static_images {
            for kind in [ChartKind::Price, ChartKind::Rsi, ChartKind::Macd] {
                let chart = match kind {
                    ChartKind::Price => LineChart::new(format!("{} price over time", job.ticker), "Price")
                        .line(Line::dense("Close Price", "#1f77b4", &closes))
                        .line(Line::new("Moving Average", "#ff7f0e", ma.clone())),
                    ChartKind::Rsi => LineChart::new(format!("{} RSI", job.ticker), "RSI")
                        .line(Line::new("RSI", "#9467bd", column_or_undefined(series, RSI)))
                        .y_range(0.0, 100.0)
                        .guide(30.0)
                        .guide(70.0),
                    ChartKind::Macd => {
                        let macd = column_or_undefined(series, MACD);
                        let signal = column_or_undefined(series, MACD_SIGNAL);
                        let histogram = macd_histogram(&macd, &signal);
                        LineChart::new(format!("{} MACD", job.ticker), "MACD")
                            .bars("Histogram", histogram)
                            .line(Line::new("MACD", "#1f77b4", macd))
                            .line(Line::new("Signal", "#d62728", signal))
                            .guide(0.0)
                    }
                };
                let path = job.out_dir.join(chart_file_name(job.stem, kind, "svg"));
                write_artifact(&path, &chart.render(&dates))?;
                written.push(path);
            }
        }

        info!(ticker = job.ticker, files = written.len(), "charts rendered");
        Ok(written)
    }
}

/// Named column values, or all-undefined when the column was never computed.
fn column_or_undefined(series: &PriceSeries, name: &str) -> Vec<Option<f64>> {
    series
        .column(name)
        .map(|c| c.values.clone())
        .unwrap_or_else(|| vec![None; series.len()])
}

fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write chart {}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "chart written");
    Ok(())
}
