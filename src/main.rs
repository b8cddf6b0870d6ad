// =============================================================================
// Stockscope — Main Entry Point
// =============================================================================
//
// Interactive, single-run analysis of one ticker: prompt for inputs, fetch
// daily history, derive indicators, write charts, print a summary, and export
// the series to CSV.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod chart;
mod config;
mod export;
mod indicators;
mod market_data;
mod pipeline;
mod prompt;
mod summary;
mod types;

use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::chart::FileChartRenderer;
use crate::config::{AnalyzerConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use crate::export::CsvExporter;
use crate::market_data::YahooClient;
use crate::pipeline::{Orchestrator, RunOutcome};
use crate::prompt::Prompter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    // Logs go to stderr so they never interleave with prompts.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = if config_path.exists() {
        AnalyzerConfig::load(&config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AnalyzerConfig::default()
        })
    } else {
        debug!(path = %config_path.display(), "no config file, using defaults");
        AnalyzerConfig::default()
    };

    // ── 2. Wire collaborators ────────────────────────────────────────────
    let fetcher = YahooClient::new(config.provider_base_url.clone(), config.http_timeout())?;
    let renderer = FileChartRenderer {
        html: config.html_chart,
        static_images: config.static_charts,
    };
    let orchestrator = Orchestrator::new(fetcher, renderer, CsvExporter, config);

    let stdin = io::stdin();
    let today = chrono::Local::now().date_naive();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout(), today);
    prompter.welcome()?;

    // ── 3. Run ───────────────────────────────────────────────────────────
    let mut stdout = io::stdout();
    match orchestrator.run(&mut prompter, &mut stdout).await? {
        RunOutcome::NoData { stages } => {
            info!(stages = ?stages, "run ended without data");
        }
        RunOutcome::Completed(report) => {
            info!(
                ticker = %report.summary.ticker,
                rows = report.rows,
                average_close = report.summary.average_close,
                charts = report.charts.len(),
                csv = %report.csv_path.display(),
                stages = ?report.stages,
                "run complete"
            );
        }
    }
    stdout.flush()?;

    Ok(())
}
