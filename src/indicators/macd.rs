// =============================================================================
// MACD — Moving Average Convergence / Divergence
// =============================================================================
//
//   MACD   = EMA(short) - EMA(long)
//   signal = EMA(signal_span) of the MACD line
//
// Every EMA is seeded at its first input, so both lines are defined at every
// position of the input.

use super::ema::calculate_ema;
use super::{ensure_window, IndicatorError};

/// MACD line and its signal line, aligned to the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdResult {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// MACD minus signal (the histogram bars). Positions where either line is
/// undefined are drawn as zero.
pub fn macd_histogram(macd: &[Option<f64>], signal: &[Option<f64>]) -> Vec<f64> {
    macd.iter()
        .zip(signal)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => m - s,
            _ => 0.0,
        })
        .collect()
}

pub fn calculate_macd(
    closes: &[f64],
    short: usize,
    long: usize,
    signal: usize,
) -> Result<MacdResult, IndicatorError> {
    ensure_window("macd_short", short, 1)?;
    ensure_window("macd_long", long, 1)?;
    ensure_window("macd_signal", signal, 1)?;

    let short_ema = calculate_ema(closes, short)?;
    let long_ema = calculate_ema(closes, long)?;

    let macd: Vec<f64> = short_ema
        .iter()
        .zip(&long_ema)
        .map(|(s, l)| s - l)
        .collect();
    let signal = calculate_ema(&macd, signal)?;

    Ok(MacdResult { macd, signal })
}
