// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha = 2 / (span + 1)
//   EMA_0 = close_0
//   EMA_t = close_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The series is seeded with the first observation and has no warm-up period,
// so every input position gets a value.
// =============================================================================

use super::{ensure_non_empty, ensure_window, IndicatorError};

/// Compute the EMA of `values` for the given `span`, aligned to the input.
///
/// # Errors
/// - `span == 0` => [`IndicatorError::InvalidWindow`]
/// - empty input => [`IndicatorError::EmptySeries`]
/// - a non-finite input or intermediate value => [`IndicatorError::NonFinite`]
pub fn calculate_ema(values: &[f64], span: usize) -> Result<Vec<f64>, IndicatorError> {
    ensure_window("ema", span, 1)?;
    ensure_non_empty(values)?;

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    for (i, &v) in values.iter().enumerate() {
        let ema = if i == 0 { v } else { v * alpha + prev * (1.0 - alpha) };
        if !ema.is_finite() {
            return Err(IndicatorError::NonFinite { index: i });
        }
        result.push(ema);
        prev = ema;
    }

    Ok(result)
}
