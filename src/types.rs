// =============================================================================
// Shared types used across the analysis pipeline
// =============================================================================

use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

/// Relative look-back window understood by the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Period {
    /// Every supported period, shortest first.
    pub const ALL: [Period; 11] = [
        Self::OneDay,
        Self::FiveDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::TwoYears,
        Self::FiveYears,
        Self::TenYears,
        Self::YearToDate,
        Self::Max,
    ];

    /// Provider code, e.g. `"1mo"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::OneMonth
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| InputError::UnknownPeriod(s.trim().to_string()))
    }
}

/// What slice of history to fetch: a relative period or an explicit
/// `[start, end)` date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRange {
    Period(Period),
    Dates { start: NaiveDate, end: NaiveDate },
}

impl FetchRange {
    /// Build a date range, rejecting `start >= end`.
    pub fn dates(start: NaiveDate, end: NaiveDate) -> Result<Self, InputError> {
        if start >= end {
            return Err(InputError::EmptyDateRange { start, end });
        }
        Ok(Self::Dates { start, end })
    }

    /// Label used in output filenames: `1mo` or `2024-01-01_2024-06-30`.
    pub fn label(&self) -> String {
        match self {
            Self::Period(p) => p.to_string(),
            Self::Dates { start, end } => format!("{start}_{end}"),
        }
    }
}

impl std::fmt::Display for FetchRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Period(p) => write!(f, "period {p}"),
            Self::Dates { start, end } => write!(f, "{start} .. {end}"),
        }
    }
}

/// Everything the orchestrator needs to start a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub ticker: String,
    pub range: FetchRange,
}

impl RunRequest {
    pub fn new(ticker: &str, range: FetchRange) -> Result<Self, InputError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(InputError::EmptyTicker);
        }
        // The ticker lands in the provider URL path and in output file names.
        if !ticker.chars().all(is_ticker_char) {
            return Err(InputError::InvalidTicker(ticker));
        }
        Ok(Self { ticker, range })
    }

    /// `{ticker}_{label}`, the default stem for every output file.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.ticker, self.range.label())
    }
}

/// Symbols look like `AAPL`, `BRK.B`, `^GSPC`, `EURUSD=X`, `BTC-USD`.
fn is_ticker_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-')
}

/// Rejected user input. Raised before anything is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("ticker must not be empty")]
    EmptyTicker,
    #[error("invalid ticker '{0}' (letters, digits and . ^ = - only)")]
    InvalidTicker(String),
    #[error("unknown period '{0}' (expected one of 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)")]
    UnknownPeriod(String),
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("start date {start} must be before end date {end}")]
    EmptyDateRange { start: NaiveDate, end: NaiveDate },
    #[error("input closed before all answers were given")]
    UnexpectedEof,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn period_parses_every_code() {
        for p in Period::ALL {
            assert_eq!(p.as_str().parse::<Period>().unwrap(), p);
        }
        assert_eq!(" 1MO ".parse::<Period>().unwrap(), Period::OneMonth);
    }

    #[test]
    fn period_rejects_unknown() {
        assert_eq!(
            "2w".parse::<Period>(),
            Err(InputError::UnknownPeriod("2w".into()))
        );
    }

    #[test]
    fn date_range_must_be_ordered() {
        let a = date("2024-01-01");
        let b = date("2024-02-01");
        assert!(FetchRange::dates(a, b).is_ok());
        assert!(FetchRange::dates(b, a).is_err());
        assert!(FetchRange::dates(a, a).is_err());
    }

    #[test]
    fn file_stem_uses_period_or_dates() {
        let req = RunRequest::new(" aapl ", FetchRange::Period(Period::OneMonth)).unwrap();
        assert_eq!(req.file_stem(), "AAPL_1mo");

        let range = FetchRange::dates(date("2024-01-01"), date("2024-03-01")).unwrap();
        let req = RunRequest::new("MSFT", range).unwrap();
        assert_eq!(req.file_stem(), "MSFT_2024-01-01_2024-03-01");
    }

    #[test]
    fn empty_ticker_rejected() {
        assert_eq!(
            RunRequest::new("   ", FetchRange::Period(Period::Max)),
            Err(InputError::EmptyTicker)
        );
    }

    #[test]
    fn ticker_charset_is_restricted() {
        let range = FetchRange::Period(Period::OneMonth);
        for ok in ["brk.b", "^GSPC", "EURUSD=X", "BTC-USD", "7203.T"] {
            assert!(RunRequest::new(ok, range).is_ok(), "{ok} should be accepted");
        }
        for bad in ["AAPL/../x", "AAPL?range=max", "AA#PL", "AA PL", "ÄPFEL"] {
            assert_eq!(
                RunRequest::new(bad, range),
                Err(InputError::InvalidTicker(bad.trim().to_uppercase())),
                "{bad} should be rejected"
            );
        }
    }
}
