// =============================================================================
// Trailing-window statistics: Simple Moving Average and standard deviation
// =============================================================================
//
// Both functions return one entry per input position. The first
// `window - 1` entries are `None` because the trailing window is not yet full.
//
// Standard deviation is the *sample* statistic (n - 1 denominator), so it
// needs a window of at least two observations.

use super::{ensure_non_empty, ensure_window, IndicatorError};

/// Trailing arithmetic mean over `window` closes, inclusive of the current one.
pub fn moving_average(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    ensure_window("moving_average", window, 1)?;
    ensure_non_empty(closes)?;

    let mut result = vec![None; closes.len()];
    if closes.len() < window {
        return Ok(result);
    }

    // Running sum; re-summing each window would be O(n * window).
    let mut sum: f64 = closes[..window].iter().sum();
    result[window - 1] = Some(sum / window as f64);
    for i in window..closes.len() {
        sum += closes[i] - closes[i - window];
        result[i] = Some(sum / window as f64);
    }

    Ok(result)
}

/// Trailing sample standard deviation over `window` closes.
pub fn rolling_std(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    ensure_window("std_dev", window, 2)?;
    ensure_non_empty(closes)?;

    let mut result = vec![None; closes.len()];
    for end in window..=closes.len() {
        let slice = &closes[end - window..end];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance =
            slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        result[end - 1] = Some(variance.sqrt());
    }

    Ok(result)
}
