// =============================================================================
// Yahoo Finance chart API client
// =============================================================================
//
// Daily bars come from the public `/v8/finance/chart/{ticker}` endpoint.
// Relative periods go out as `range=<code>`; explicit dates as
// `period1`/`period2` UNIX seconds with `period2` exclusive.
//
// The provider reports an unknown ticker or an empty range through
// `chart.error` (often with HTTP 404). Both are surfaced as an empty series so
// the orchestrator can take its empty-data path.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::market_data::{PriceBar, PriceSeries, SeriesFetcher};
use crate::types::FetchRange;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Yahoo Finance chart API client.
#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client against `base_url` (e.g. `https://query1.finance.yahoo.com`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    /// Full request URL for `ticker` over `range`.
    pub fn chart_url(&self, ticker: &str, range: FetchRange) -> String {
        let window = match range {
            FetchRange::Period(p) => format!("range={p}"),
            FetchRange::Dates { start, end } => {
                format!("period1={}&period2={}", unix_midnight(start), unix_midnight(end))
            }
        };
        format!(
            "{}/v8/finance/chart/{}?interval=1d&{}&events=div%2Csplits",
            self.base_url, ticker, window
        )
    }
}

impl SeriesFetcher for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch")]
    async fn fetch(&self, ticker: &str, range: FetchRange) -> Result<PriceSeries> {
        let url = self.chart_url(ticker, range);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET chart for {ticker} failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read chart response body")?;

        let series = match parse_chart_response(&body) {
            Ok(series) => series,
            Err(e) if !status.is_success() => {
                anyhow::bail!("Yahoo chart API returned {status}: {e:#}")
            }
            Err(e) => return Err(e),
        };

        debug!(ticker, %range, rows = series.len(), "chart fetched");
        Ok(series)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Decode a chart response body into a series.
///
/// Rows with any missing OHLCV field are skipped. Timestamps are shifted by
/// the exchange's `gmtoffset` before the calendar date is taken, otherwise
/// US sessions would land on the previous UTC day.
fn parse_chart_response(body: &str) -> Result<PriceSeries> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).context("failed to parse chart response")?;

    if let Some(err) = envelope.chart.error {
        warn!(code = %err.code, description = %err.description, "provider returned no data");
        return Ok(PriceSeries::empty());
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty());
    };

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
            value_at(&quote.volume, i),
        ) else {
            debug!(index = i, ts, "skipping incomplete row");
            continue;
        };

        let date = DateTime::from_timestamp(ts + offset, 0)
            .with_context(|| format!("timestamp {ts} out of range"))?
            .date_naive();

        bars.push(PriceBar::new(date, open, high, low, close, volume));
    }

    Ok(PriceSeries::from_unordered(bars))
}

fn value_at(col: &[Option<f64>], i: usize) -> Option<f64> {
    col.get(i).copied().flatten()
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
