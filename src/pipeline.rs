// =============================================================================
// Run Orchestrator
// =============================================================================
//
// One run walks a fixed sequence of stages:
//
//   AwaitingInput -> Fetching -> Computing -> Rendering -> Reporting
//                 -> Exporting -> Done
//
// with a single early exit, Fetching -> Empty, when the provider returns no
// rows. That path prints a message and touches no files. Rejected input ends
// the run in AwaitingInput before anything is fetched. Any later error aborts
// the remaining stages; nothing is retried.
//
// Collaborators (fetcher, chart renderer, exporter) are injected so tests can
// substitute doubles; the request itself comes from a `RequestSource`.
// =============================================================================

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::chart::{ChartJob, ChartRenderer};
use crate::config::AnalyzerConfig;
use crate::export::SeriesExporter;
use crate::indicators::apply_indicators;
use crate::market_data::SeriesFetcher;
use crate::summary::{summarize, Summary};
use crate::prompt::RequestSource;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    AwaitingInput,
    Fetching,
    Empty,
    Computing,
    Rendering,
    Reporting,
    Exporting,
    Done,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AwaitingInput => "AwaitingInput",
            Self::Fetching => "Fetching",
            Self::Empty => "Empty",
            Self::Computing => "Computing",
            Self::Rendering => "Rendering",
            Self::Reporting => "Reporting",
            Self::Exporting => "Exporting",
            Self::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub rows: usize,
    pub summary: Summary,
    pub charts: Vec<PathBuf>,
    pub csv_path: PathBuf,
    pub stages: Vec<RunStage>,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The provider had nothing for this ticker / range.
    NoData { stages: Vec<RunStage> },
    Completed(RunReport),
}

/// Ordered record of visited stages, logged as it advances.
#[derive(Debug, Default)]
struct StageTrace {
    stages: Vec<RunStage>,
}

impl StageTrace {
    fn enter(&mut self, stage: RunStage) {
        let from = self.stages.last().copied();
        info!(from = ?from, to = %stage, "run stage");
        self.stages.push(stage);
    }
}

/// Sequences fetch, indicators, charts, summary, and export for one request.
pub struct Orchestrator<F, C, E> {
    fetcher: F,
    renderer: C,
    exporter: E,
    config: AnalyzerConfig,
}

impl<F, C, E> Orchestrator<F, C, E>
where
    F: SeriesFetcher,
    C: ChartRenderer,
    E: SeriesExporter,
{
    pub fn new(fetcher: F, renderer: C, exporter: E, config: AnalyzerConfig) -> Self {
        Self {
            fetcher,
            renderer,
            exporter,
            config,
        }
    }

    /// Execute one run. User-facing progress goes to `out`.
    pub async fn run(
        &self,
        source: &mut impl RequestSource,
        out: &mut impl Write,
    ) -> Result<RunOutcome> {
        let mut trace = StageTrace::default();
        trace.enter(RunStage::AwaitingInput);
        let request = match source.next_request() {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "input rejected");
                return Err(e);
            }
        };
        info!(ticker = %request.ticker, range = %request.range, "request accepted");

        // ── Fetching ─────────────────────────────────────────────────────────
        trace.enter(RunStage::Fetching);
        let mut series = self
            .fetcher
            .fetch(&request.ticker, request.range)
            .await
            .with_context(|| format!("failed to fetch {} ({})", request.ticker, request.range))?;

        if series.is_empty() {
            trace.enter(RunStage::Empty);
            warn!(ticker = %request.ticker, range = %request.range, "no data returned");
            writeln!(
                out,
                "No data returned for {} ({}). Check the ticker symbol, period, or dates.",
                request.ticker, request.range
            )?;
            return Ok(RunOutcome::NoData {
                stages: trace.stages,
            });
        }
        info!(ticker = %request.ticker, rows = series.len(), "series fetched");

        // ── Computing ────────────────────────────────────────────────────────
        trace.enter(RunStage::Computing);
        apply_indicators(&mut series, &self.config.indicator_params())
            .context("failed to compute indicators")?;

        // ── Rendering ────────────────────────────────────────────────────────
        trace.enter(RunStage::Rendering);
        let out_dir = &self.config.output_dir;
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

        let default_stem = request.file_stem();
        let chart_stem = self
            .config
            .chart_filename_prefix
            .as_deref()
            .unwrap_or(&default_stem);
        let charts = self.renderer.render(&ChartJob {
            ticker: &request.ticker,
            series: &series,
            out_dir,
            stem: chart_stem,
        })?;
        for path in &charts {
            writeln!(out, "Chart saved as {}", path.display())?;
        }

        // ── Reporting ────────────────────────────────────────────────────────
        trace.enter(RunStage::Reporting);
        let summary = summarize(&request.ticker, &series, self.config.fluctuation_threshold_pct)
            .context("failed to summarise series")?;
        writeln!(out, "{summary}")?;

        // ── Exporting ────────────────────────────────────────────────────────
        trace.enter(RunStage::Exporting);
        let csv_name = self
            .config
            .csv_filename
            .clone()
            .unwrap_or_else(|| format!("{default_stem}_stock_data.csv"));
        let csv_path = out_dir.join(csv_name);
        self.exporter.export(&series, &csv_path)?;
        writeln!(out, "Data file created: {}", csv_path.display())?;

        trace.enter(RunStage::Done);
        Ok(RunOutcome::Completed(RunReport {
            rows: series.len(),
            summary,
            charts,
            csv_path,
            stages: trace.stages,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::FileChartRenderer;
    use crate::export::{read_series_csv, CsvExporter};
    use crate::market_data::{PriceBar, PriceSeries};
    use crate::prompt::Prompter;
    use crate::types::{FetchRange, InputError, Period, RunRequest};
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};
    use std::path::Path;

    // ---- Test doubles ------------------------------------------------------

    struct FixedFetcher {
        series: PriceSeries,
        calls: Cell<usize>,
    }

    impl SeriesFetcher for FixedFetcher {
        async fn fetch(&self, _ticker: &str, _range: FetchRange) -> Result<PriceSeries> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.series.clone())
        }
    }

    struct FailingFetcher;

    impl SeriesFetcher for FailingFetcher {
        async fn fetch(&self, _ticker: &str, _range: FetchRange) -> Result<PriceSeries> {
            anyhow::bail!("connection refused")
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Cell<usize>,
        columns_seen: RefCell<Vec<String>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, job: &ChartJob<'_>) -> Result<Vec<PathBuf>> {
            self.calls.set(self.calls.get() + 1);
            *self.columns_seen.borrow_mut() =
                job.series.columns().iter().map(|c| c.name.clone()).collect();
            Ok(vec![job.out_dir.join(format!("{}_price_chart.svg", job.stem))])
        }
    }

    #[derive(Default)]
    struct RecordingExporter {
        paths: RefCell<Vec<PathBuf>>,
    }

    impl SeriesExporter for RecordingExporter {
        fn export(&self, _series: &PriceSeries, path: &Path) -> Result<()> {
            self.paths.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    struct FailingExporter;

    impl SeriesExporter for FailingExporter {
        fn export(&self, _series: &PriceSeries, path: &Path) -> Result<()> {
            anyhow::bail!("disk full writing {}", path.display())
        }
    }

    /// Hands out the same request on every call.
    struct Given(RunRequest);

    impl RequestSource for Given {
        fn next_request(&mut self) -> Result<RunRequest> {
            Ok(self.0.clone())
        }
    }

    // ---- Helpers -----------------------------------------------------------

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                PriceBar::new(start + chrono::Days::new(i as u64), c, c + 1.0, c - 1.0, c, 100.0)
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn fetcher(closes: &[f64]) -> FixedFetcher {
        FixedFetcher {
            series: series(closes),
            calls: Cell::new(0),
        }
    }

    fn config_in(dir: &Path) -> AnalyzerConfig {
        AnalyzerConfig {
            output_dir: dir.to_path_buf(),
            ..AnalyzerConfig::default()
        }
    }

    fn request() -> Given {
        Given(RunRequest::new("AAPL", FetchRange::Period(Period::OneMonth)).unwrap())
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    // ---- Tests -------------------------------------------------------------

    #[tokio::test]
    async fn empty_fetch_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let renderer = RecordingRenderer::default();
        let exporter = RecordingExporter::default();
        let orch = Orchestrator::new(fetcher(&[]), &renderer, &exporter, config_in(&out_dir));

        let mut console = Vec::new();
        let outcome = orch.run(&mut request(), &mut console).await.unwrap();

        let RunOutcome::NoData { stages } = outcome else {
            panic!("expected NoData");
        };
        assert_eq!(
            stages,
            vec![RunStage::AwaitingInput, RunStage::Fetching, RunStage::Empty]
        );
        assert_eq!(renderer.calls.get(), 0);
        assert!(exporter.paths.borrow().is_empty());
        assert!(!out_dir.exists(), "no output directory should be created");
        let text = String::from_utf8(console).unwrap();
        assert!(text.contains("No data returned for AAPL"));
    }

    #[tokio::test]
    async fn full_run_visits_every_stage_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = RecordingRenderer::default();
        let exporter = RecordingExporter::default();
        let f = fetcher(&rising(30));
        let orch = Orchestrator::new(&f, &renderer, &exporter, config_in(dir.path()));

        let mut console = Vec::new();
        let RunOutcome::Completed(report) = orch.run(&mut request(), &mut console).await.unwrap() else {
            panic!("expected Completed");
        };

        assert_eq!(
            report.stages,
            vec![
                RunStage::AwaitingInput,
                RunStage::Fetching,
                RunStage::Computing,
                RunStage::Rendering,
                RunStage::Reporting,
                RunStage::Exporting,
                RunStage::Done,
            ]
        );
        assert_eq!(f.calls.get(), 1);
        assert_eq!(report.rows, 30);
        // Renderer sees the computed columns.
        assert_eq!(
            *renderer.columns_seen.borrow(),
            vec!["moving_average", "std_dev", "rsi", "macd", "macd_signal"]
        );
        assert_eq!(
            *exporter.paths.borrow(),
            vec![dir.path().join("AAPL_1mo_stock_data.csv")]
        );
        assert_eq!(report.csv_path, dir.path().join("AAPL_1mo_stock_data.csv"));
        assert!((report.summary.average_close - 114.5).abs() < 1e-9);

        let text = String::from_utf8(console).unwrap();
        assert!(text.contains("Chart saved as"));
        assert!(text.contains("Average close price"));
        assert!(text.contains("Data file created"));
    }

    #[tokio::test]
    async fn configured_filenames_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = RecordingRenderer::default();
        let exporter = RecordingExporter::default();
        let config = AnalyzerConfig {
            csv_filename: Some("mine.csv".into()),
            chart_filename_prefix: Some("custom".into()),
            ..config_in(dir.path())
        };
        let orch = Orchestrator::new(fetcher(&rising(5)), &renderer, &exporter, config);

        let RunOutcome::Completed(report) = orch.run(&mut request(), &mut std::io::sink()).await.unwrap() else {
            panic!("expected Completed");
        };
        assert_eq!(report.csv_path, dir.path().join("mine.csv"));
        assert_eq!(report.charts, vec![dir.path().join("custom_price_chart.svg")]);
    }

    #[tokio::test]
    async fn fetch_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = RecordingRenderer::default();
        let orch = Orchestrator::new(
            FailingFetcher,
            &renderer,
            RecordingExporter::default(),
            config_in(dir.path()),
        );
        let err = orch.run(&mut request(), &mut std::io::sink()).await.unwrap_err();
        assert!(format!("{err:#}").contains("connection refused"));
        assert_eq!(renderer.calls.get(), 0);
    }

    #[tokio::test]
    async fn export_failure_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let orch = Orchestrator::new(
            fetcher(&rising(10)),
            RecordingRenderer::default(),
            FailingExporter,
            config_in(dir.path()),
        );
        let mut console = Vec::new();
        let err = orch.run(&mut request(), &mut console).await.unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert!(!String::from_utf8(console).unwrap().contains("Data file created"));
    }

    #[tokio::test]
    async fn zero_close_is_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = RecordingExporter::default();
        let orch = Orchestrator::new(
            fetcher(&[0.0, 1.0, 2.0]),
            RecordingRenderer::default(),
            &exporter,
            config_in(dir.path()),
        );
        let err = orch.run(&mut request(), &mut std::io::sink()).await.unwrap_err();
        assert!(format!("{err:#}").contains("minimum close"));
        assert!(exporter.paths.borrow().is_empty());
    }

    #[tokio::test]
    async fn end_to_end_with_real_writers() {
        let dir = tempfile::tempdir().unwrap();
        let range = FetchRange::dates(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
        .unwrap();
        let req = RunRequest::new("msft", range).unwrap();
        let orch = Orchestrator::new(
            fetcher(&rising(25)),
            FileChartRenderer::default(),
            CsvExporter,
            config_in(dir.path()),
        );

        let RunOutcome::Completed(report) = orch.run(&mut Given(req), &mut std::io::sink()).await.unwrap() else {
            panic!("expected Completed");
        };
        assert_eq!(report.charts.len(), 4);
        assert!(dir
            .path()
            .join("MSFT_2024-04-01_2024-05-01_rsi_chart.svg")
            .exists());

        let back = read_series_csv(&report.csv_path).unwrap();
        assert_eq!(back.len(), 25);
        assert_eq!(back.columns().len(), 5);
    }

    #[tokio::test]
    async fn rejected_input_stops_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let f = fetcher(&rising(10));
        let renderer = RecordingRenderer::default();
        let orch = Orchestrator::new(
            &f,
            &renderer,
            RecordingExporter::default(),
            config_in(dir.path()),
        );
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let mut prompts = Vec::new();
        let answers = b"AAPL\n1mo\n2024-05-01\n2024-04-01\n";
        let mut source = Prompter::new(&answers[..], &mut prompts, today);

        let err = orch.run(&mut source, &mut std::io::sink()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::EmptyDateRange { .. })
        ));
        assert_eq!(f.calls.get(), 0);
        assert_eq!(renderer.calls.get(), 0);
    }

    #[tokio::test]
    async fn prompted_request_drives_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = RecordingExporter::default();
        let orch = Orchestrator::new(
            fetcher(&rising(12)),
            RecordingRenderer::default(),
            &exporter,
            config_in(dir.path()),
        );
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let mut prompts = Vec::new();
        let mut source = Prompter::new(&b"tsla\n3mo\n\n"[..], &mut prompts, today);

        let RunOutcome::Completed(report) =
            orch.run(&mut source, &mut std::io::sink()).await.unwrap()
        else {
            panic!("expected Completed");
        };
        assert_eq!(report.summary.ticker, "TSLA");
        assert_eq!(
            *exporter.paths.borrow(),
            vec![dir.path().join("TSLA_3mo_stock_data.csv")]
        );
    }
}
