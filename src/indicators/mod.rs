// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators derived from a
// close-price series. Rolling statistics return `Option<f64>` per position so
// the warm-up window is explicit; every function rejects an empty series or
// an unusable window with an `IndicatorError` instead of producing NaNs.

pub mod ema;
pub mod macd;
pub mod rolling;
pub mod rsi;

use thiserror::Error;
use tracing::debug;

use crate::market_data::{PriceSeries, SeriesError};

pub use macd::{calculate_macd, macd_histogram};
pub use rolling::{moving_average, rolling_std};
pub use rsi::{calculate_rsi, RsiZone};

/// Column names appended by [`apply_indicators`], in export order.
pub const MOVING_AVERAGE: &str = "moving_average";
pub const STD_DEV: &str = "std_dev";
pub const RSI: &str = "rsi";
pub const MACD: &str = "macd";
pub const MACD_SIGNAL: &str = "macd_signal";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("cannot compute indicators on an empty series")]
    EmptySeries,
    #[error("{indicator} window must be at least {min}, got {window}")]
    InvalidWindow {
        indicator: &'static str,
        window: usize,
        min: usize,
    },
    #[error("non-finite value at position {index}")]
    NonFinite { index: usize },
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Look-back windows for every indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub ma_window: usize,
    pub std_window: usize,
    pub rsi_window: usize,
    pub macd_short: usize,
    pub macd_long: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ma_window: 5,
            std_window: 5,
            rsi_window: 14,
            macd_short: 12,
            macd_long: 26,
            macd_signal: 9,
        }
    }
}

/// Compute every indicator over the series closes and append the columns
/// `moving_average`, `std_dev`, `rsi`, `macd`, `macd_signal`.
///
/// Nothing is appended unless every indicator succeeds.
pub fn apply_indicators(
    series: &mut PriceSeries,
    params: &IndicatorParams,
) -> Result<(), IndicatorError> {
    let closes = series.closes();
    ensure_non_empty(&closes)?;

    let ma = moving_average(&closes, params.ma_window)?;
    let sd = rolling_std(&closes, params.std_window)?;
    let rsi = calculate_rsi(&closes, params.rsi_window)?;
    let macd = calculate_macd(
        &closes,
        params.macd_short,
        params.macd_long,
        params.macd_signal,
    )?;

    series.add_column(MOVING_AVERAGE, ma)?;
    series.add_column(STD_DEV, sd)?;
    series.add_column(RSI, rsi)?;
    series.add_column(MACD, macd.macd.into_iter().map(Some).collect())?;
    series.add_column(MACD_SIGNAL, macd.signal.into_iter().map(Some).collect())?;

    for column in series.columns() {
        debug!(
            column = %column.name,
            warmup = column.undefined_prefix(),
            latest = ?column.last_defined(),
            "indicator column"
        );
    }
    debug!(rows = closes.len(), columns = series.columns().len(), "indicators applied");
    Ok(())
}

// =============================================================================
// Shared guards
// =============================================================================

pub(crate) fn ensure_non_empty(values: &[f64]) -> Result<(), IndicatorError> {
    if values.is_empty() {
        return Err(IndicatorError::EmptySeries);
    }
    Ok(())
}

pub(crate) fn ensure_window(
    indicator: &'static str,
    window: usize,
    min: usize,
) -> Result<(), IndicatorError> {
    if window < min {
        return Err(IndicatorError::InvalidWindow {
            indicator,
            window,
            min,
        });
    }
    Ok(())
}
