// =============================================================================
// Analyzer Configuration — indicator windows, thresholds, output locations
// =============================================================================
//
// Loaded once at startup from a JSON file. All fields carry
// `#[serde(default)]` so that a partial file (or an older one missing newer
// keys) still loads, with the rest filled from defaults.
//
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::indicators::IndicatorParams;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "analyzer_config.json";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "STOCK_ANALYZER_CONFIG";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_ma_window() -> usize {
    5
}

fn default_std_window() -> usize {
    5
}

fn default_rsi_window() -> usize {
    14
}

fn default_macd_short() -> usize {
    12
}

fn default_macd_long() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_fluctuation_threshold_pct() -> f64 {
    10.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

// =============================================================================
// AnalyzerConfig
// =============================================================================

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzerConfig {
    // --- Indicator windows ---------------------------------------------------

    /// Trailing window of the simple moving average.
    #[serde(default = "default_ma_window")]
    pub ma_window: usize,

    /// Trailing window of the sample standard deviation. Must be >= 2.
    #[serde(default = "default_std_window")]
    pub std_window: usize,

    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    #[serde(default = "default_macd_short")]
    pub macd_short: usize,

    #[serde(default = "default_macd_long")]
    pub macd_long: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    // --- Reporting -----------------------------------------------------------

    /// Close-price range, as a percent of the minimum close, above which the
    /// summary reports a strong fluctuation.
    #[serde(default = "default_fluctuation_threshold_pct")]
    pub fluctuation_threshold_pct: f64,

    // --- Outputs -------------------------------------------------------------

    /// Directory every chart and CSV file is written into. Created if missing.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// CSV file name; `{ticker}_{label}_stock_data.csv` when unset.
    #[serde(default)]
    pub csv_filename: Option<String>,

    /// Replaces the `{ticker}_{label}` stem of chart file names when set.
    #[serde(default)]
    pub chart_filename_prefix: Option<String>,

    /// Write the interactive HTML price chart.
    #[serde(default = "default_true")]
    pub html_chart: bool,

    /// Write static SVG charts for price, RSI, and MACD.
    #[serde(default = "default_true")]
    pub static_charts: bool,

    // --- Provider ------------------------------------------------------------

    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ma_window: default_ma_window(),
            std_window: default_std_window(),
            rsi_window: default_rsi_window(),
            macd_short: default_macd_short(),
            macd_long: default_macd_long(),
            macd_signal: default_macd_signal(),
            fluctuation_threshold_pct: default_fluctuation_threshold_pct(),
            output_dir: default_output_dir(),
            csv_filename: None,
            chart_filename_prefix: None,
            html_chart: true,
            static_charts: true,
            provider_base_url: default_provider_base_url(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file at `path` and validate it.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid config in {}", path.display()))?;

        info!(
            path = %path.display(),
            output_dir = %config.output_dir.display(),
            threshold = config.fluctuation_threshold_pct,
            "config loaded"
        );

        Ok(config)
    }

    /// Reject windows no indicator can work with.
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("ma_window", self.ma_window, 1),
            ("std_window", self.std_window, 2),
            ("rsi_window", self.rsi_window, 1),
            ("macd_short", self.macd_short, 1),
            ("macd_long", self.macd_long, 1),
            ("macd_signal", self.macd_signal, 1),
        ];
        for (name, value, min) in windows {
            if value < min {
                anyhow::bail!("{name} must be at least {min}, got {value}");
            }
        }
        if self.macd_short > self.macd_long {
            anyhow::bail!(
                "macd_short ({}) must not exceed macd_long ({})",
                self.macd_short,
                self.macd_long
            );
        }
        if !self.fluctuation_threshold_pct.is_finite() {
            anyhow::bail!("fluctuation_threshold_pct must be finite");
        }
        Ok(())
    }

    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            ma_window: self.ma_window,
            std_window: self.std_window,
            rsi_window: self.rsi_window,
            macd_short: self.macd_short,
            macd_long: self.macd_long,
            macd_signal: self.macd_signal,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
