// =============================================================================
// Summary Reporter
// =============================================================================
//
// Human-readable statistics over a finished series:
//   - average close price
//   - fluctuation check: 100 * (max - min) / min against a percent threshold
//   - latest RSI reading and its zone, when RSI is defined anywhere
//
// A non-positive minimum close would make the fluctuation percentage
// meaningless (or divide by zero), so it is rejected with a typed error.

use chrono::NaiveDate;
use thiserror::Error;

use crate::indicators::{RsiZone, RSI};
use crate::market_data::PriceSeries;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    #[error("cannot summarise an empty series")]
    EmptySeries,
    #[error("minimum close is {0}, fluctuation percentage is undefined")]
    NonPositiveMinimum(f64),
}

/// Result of comparing the close-price range against a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct FluctuationCheck {
    pub max: f64,
    pub min: f64,
    pub range: f64,
    pub percent: f64,
    pub threshold_percent: f64,
    pub exceeded: bool,
}

impl std::fmt::Display for FluctuationCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exceeded {
            write!(
                f,
                "Price fluctuated by {:.2}% over the period, exceeding the {}% threshold.",
                self.percent, self.threshold_percent
            )
        } else {
            write!(
                f,
                "Price fluctuation of {:.2}% did not exceed the {}% threshold.",
                self.percent, self.threshold_percent
            )
        }
    }
}

/// Everything the reporter prints for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub ticker: String,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub average_close: f64,
    pub fluctuation: FluctuationCheck,
    pub latest_rsi: Option<(f64, RsiZone)>,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{}: {} sessions from {} to {}",
            self.ticker, self.rows, self.first_date, self.last_date
        )?;
        writeln!(f, "Average close price: {:.4}", self.average_close)?;
        write!(f, "{}", self.fluctuation)?;
        if let Some((value, zone)) = self.latest_rsi {
            write!(f, "\nLatest RSI: {value:.2} ({zone})")?;
        }
        Ok(())
    }
}

/// Arithmetic mean of all closes.
pub fn average_close(closes: &[f64]) -> Result<f64, SummaryError> {
    if closes.is_empty() {
        return Err(SummaryError::EmptySeries);
    }
    Ok(closes.iter().sum::<f64>() / closes.len() as f64)
}

/// Compare `100 * (max - min) / min` of the closes against `threshold_percent`.
/// Strictly greater counts as exceeded.
pub fn check_fluctuation(
    closes: &[f64],
    threshold_percent: f64,
) -> Result<FluctuationCheck, SummaryError> {
    if closes.is_empty() {
        return Err(SummaryError::EmptySeries);
    }

    let max = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = closes.iter().copied().fold(f64::INFINITY, f64::min);

    // Division-by-zero guard.
    if min <= 0.0 {
        return Err(SummaryError::NonPositiveMinimum(min));
    }

    let range = max - min;
    let percent = range / min * 100.0;

    Ok(FluctuationCheck {
        max,
        min,
        range,
        percent,
        threshold_percent,
        exceeded: percent > threshold_percent,
    })
}

/// Build the full summary for `series`.
pub fn summarize(
    ticker: &str,
    series: &PriceSeries,
    threshold_percent: f64,
) -> Result<Summary, SummaryError> {
    let (Some(first_date), Some(last_date)) = (series.first_date(), series.last_date()) else {
        return Err(SummaryError::EmptySeries);
    };
    let closes = series.closes();

    let latest_rsi = series
        .column(RSI)
        .and_then(|c| c.last_defined())
        .map(|v| (v, RsiZone::classify(v)));

    Ok(Summary {
        ticker: ticker.to_string(),
        rows: series.len(),
        first_date,
        last_date,
        average_close: average_close(&closes)?,
        fluctuation: check_fluctuation(&closes, threshold_percent)?,
        latest_rsi,
    })
}
