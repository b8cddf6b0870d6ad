// =============================================================================
// CSV export / import of a finished series
// =============================================================================
//
// Layout: a header row, then one row per session.
//   date,open,high,low,close,volume,<indicator columns in insertion order>
// Undefined indicator entries are written as empty fields.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::market_data::{PriceBar, PriceSeries};

const BASE_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Sink for the final series.
pub trait SeriesExporter {
    fn export(&self, series: &PriceSeries, path: &Path) -> Result<()>;
}

impl<T: SeriesExporter + ?Sized> SeriesExporter for &T {
    fn export(&self, series: &PriceSeries, path: &Path) -> Result<()> {
        (**self).export(series, path)
    }
}

/// Writes the series as comma-separated values.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl SeriesExporter for CsvExporter {
    fn export(&self, series: &PriceSeries, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
        header.extend(series.columns().iter().map(|c| c.name.as_str()));
        writer.write_record(&header)?;

        for (i, bar) in series.bars().iter().enumerate() {
            let mut record = vec![
                bar.date.to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ];
            record.extend(
                series
                    .columns()
                    .iter()
                    .map(|c| c.values[i].map_or(String::new(), |v| v.to_string())),
            );
            writer
                .write_record(&record)
                .with_context(|| format!("failed to write row {i} to {}", path.display()))?;
        }

        writer
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;
        drop(writer);

        verify_written(series, path)?;

        info!(path = %path.display(), rows = series.len(), "series exported");
        Ok(())
    }
}

/// Re-read a freshly written file and check it holds the same rows and columns.
fn verify_written(series: &PriceSeries, path: &Path) -> Result<()> {
    let written = read_series_csv(path)
        .with_context(|| format!("failed to verify {}", path.display()))?;
    let expected: Vec<&str> = series.columns().iter().map(|c| c.name.as_str()).collect();
    let found: Vec<&str> = written.columns().iter().map(|c| c.name.as_str()).collect();
    if written.len() != series.len() || found != expected {
        anyhow::bail!(
            "{} holds {} rows {:?}, expected {} rows {:?}",
            path.display(),
            written.len(),
            found,
            series.len(),
            expected
        );
    }
    Ok(())
}

/// Read back a file written by [`CsvExporter`].
///
/// Every non-empty cell must parse as a number; only an empty indicator cell
/// reads back as undefined.
pub fn read_series_csv(path: &Path) -> Result<PriceSeries> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let header = reader.headers()?.clone();
    let names: Vec<&str> = header.iter().collect();
    if names.len() < BASE_COLUMNS.len() || names[..BASE_COLUMNS.len()] != BASE_COLUMNS {
        anyhow::bail!("{} does not start with {:?}", path.display(), BASE_COLUMNS);
    }
    let extra: Vec<String> = names[BASE_COLUMNS.len()..]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut bars = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); extra.len()];

    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error in row {row}"))?;
        let field = |i: usize| record.get(i).unwrap_or("");
        let number = |i: usize| -> Result<f64> {
            field(i)
                .parse::<f64>()
                .with_context(|| format!("row {row}: bad {} value '{}'", BASE_COLUMNS[i], field(i)))
        };

        let date = NaiveDate::parse_from_str(field(0), "%Y-%m-%d")
            .with_context(|| format!("row {row}: bad date '{}'", field(0)))?;
        bars.push(PriceBar::new(
            date,
            number(1)?,
            number(2)?,
            number(3)?,
            number(4)?,
            number(5)?,
        ));

        for (j, (column, name)) in values.iter_mut().zip(&extra).enumerate() {
            let raw = field(BASE_COLUMNS.len() + j);
            let value = if raw.is_empty() {
                None
            } else {
                Some(
                    raw.parse::<f64>()
                        .with_context(|| format!("row {row}: bad {name} value '{raw}'"))?,
                )
            };
            column.push(value);
        }
    }

    let mut series = PriceSeries::new(bars)?;
    for (name, column) in extra.into_iter().zip(values) {
        series.add_column(name, column)?;
    }

    debug!(path = %path.display(), rows = series.len(), "series read back");
    Ok(series)
}
