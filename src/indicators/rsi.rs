// =============================================================================
// Relative Strength Index (RSI) — simple trailing-mean variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — delta_i = close_i - close_{i-1} (position 0 has no delta).
// Step 2 — gain_i = max(delta_i, 0), loss_i = max(-delta_i, 0).
// Step 3 — avg_gain / avg_loss = arithmetic mean of the trailing `window`
//          gains / losses (no Wilder smoothing).
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The first `window` positions are undefined.
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use super::{ensure_non_empty, ensure_window, IndicatorError};

/// Compute the RSI column for `closes`, aligned to the input.
///
/// # Edge cases
/// - `window == 0` or empty input => error
/// - fewer than `window + 1` closes => every entry is `None`
/// - average loss zero with gains => 100.0; no movement at all => 50.0
pub fn calculate_rsi(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    ensure_window("rsi", window, 1)?;
    ensure_non_empty(closes)?;

    let mut result = vec![None; closes.len()];
    if closes.len() <= window {
        return Ok(result);
    }

    // --- Split deltas into gains / losses -----------------------------------
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let d = w[1] - w[0];
            if d > 0.0 {
                (d, 0.0)
            } else {
                (0.0, -d)
            }
        })
        .unzip();

    // --- Trailing means; delta j belongs to close position j + 1 ------------
    let window_f = window as f64;
    for end in window..=gains.len() {
        let avg_gain = gains[end - window..end].iter().sum::<f64>() / window_f;
        let avg_loss = losses[end - window..end].iter().sum::<f64>() / window_f;
        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result[end] = Some(rsi),
            None => return Err(IndicatorError::NonFinite { index: end }),
        }
    }

    Ok(result)
}

/// Momentum reading of a single RSI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi >= 70.0 {
            Self::Overbought
        } else if rsi <= 30.0 {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero, RSI is 50.0 (no movement).
/// - If average loss is zero (only gains), RSI is 100.0.
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}
