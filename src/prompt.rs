// =============================================================================
// Interactive input
// =============================================================================
//
// Asks for ticker, period, and an optional explicit date range. Blank answers
// fall back to defaults: period 1mo, no date override, end date today.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::types::{FetchRange, InputError, Period, RunRequest};

const EXAMPLE_TICKERS: &str =
    "AAPL (Apple Inc), GOOGL (Alphabet Inc), MSFT (Microsoft Corporation), AMZN (Amazon.com Inc), TSLA (Tesla Inc)";

/// Supplies the request a run works on.
pub trait RequestSource {
    fn next_request(&mut self) -> Result<RunRequest>;
}

/// Reads answers from `input` and writes prompts to `output`. `today` is the
/// default end date of an explicit range.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    today: NaiveDate,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W, today: NaiveDate) -> Self {
        Self {
            input,
            output,
            today,
        }
    }

    pub fn welcome(&mut self) -> Result<()> {
        let periods: Vec<&str> = Period::ALL.iter().map(|p| p.as_str()).collect();
        writeln!(self.output, "Welcome to the stock data retrieval and charting tool.")?;
        writeln!(self.output, "Some example tickers you might consider: {EXAMPLE_TICKERS}.")?;
        writeln!(self.output, "Supported periods: {}.", periods.join(", "))?;
        Ok(())
    }

    /// Collect a complete request.
    ///
    /// Invalid answers surface as an [`InputError`] inside the returned error.
    pub fn read_request(&mut self) -> Result<RunRequest> {
        let today = self.today;
        let ticker = self.ask("Enter a stock ticker (e.g. 'AAPL' for Apple Inc): ")?;
        if ticker.is_empty() {
            return Err(InputError::EmptyTicker.into());
        }

        let period = self.ask("Enter the period (e.g. '1mo' for one month) [1mo]: ")?;
        let period = if period.is_empty() {
            Period::default()
        } else {
            period.parse::<Period>()?
        };

        let start = self.ask("Start date YYYY-MM-DD (leave blank to use the period): ")?;
        let range = if start.is_empty() {
            FetchRange::Period(period)
        } else {
            let start = parse_date(&start)?;
            let end = self.ask(&format!("End date YYYY-MM-DD [{today}]: "))?;
            let end = if end.is_empty() { today } else { parse_date(&end)? };
            FetchRange::dates(start, end)?
        };

        Ok(RunRequest::new(&ticker, range)?)
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush().context("failed to flush prompt")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read answer")?;
        if read == 0 {
            return Err(InputError::UnexpectedEof.into());
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> RequestSource for Prompter<R, W> {
    fn next_request(&mut self) -> Result<RunRequest> {
        self.read_request()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| InputError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn run(answers: &str) -> Result<RunRequest> {
        let mut out = Vec::new();
        let mut p = Prompter::new(Cursor::new(answers.as_bytes()), &mut out, today());
        p.read_request()
    }

    fn input_error(answers: &str) -> InputError {
        run(answers)
            .unwrap_err()
            .downcast::<InputError>()
            .expect("should be an input error")
    }

    #[test]
    fn period_only() {
        let req = run("aapl\n6mo\n\n").unwrap();
        assert_eq!(req.ticker, "AAPL");
        assert_eq!(req.range, FetchRange::Period(Period::SixMonths));
    }

    #[test]
    fn blank_period_defaults_to_one_month() {
        let req = run("MSFT\n\n\n").unwrap();
        assert_eq!(req.range, FetchRange::Period(Period::OneMonth));
    }

    #[test]
    fn explicit_dates_override_period() {
        let req = run("TSLA\n1y\n2024-01-02\n2024-03-01\n").unwrap();
        assert_eq!(
            req.range,
            FetchRange::Dates {
                start: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            }
        );
    }

    #[test]
    fn blank_end_date_is_today() {
        let req = run("TSLA\n\n2024-01-02\n\n").unwrap();
        assert!(matches!(req.range, FetchRange::Dates { end, .. } if end == today()));
    }

    #[test]
    fn invalid_answers() {
        assert_eq!(input_error("\n"), InputError::EmptyTicker);
        assert_eq!(input_error("AAPL\n3w\n"), InputError::UnknownPeriod("3w".into()));
        assert_eq!(
            input_error("AAPL\n1mo\n2024/01/01\n"),
            InputError::InvalidDate("2024/01/01".into())
        );
        assert!(matches!(
            input_error("AAPL\n1mo\n2024-05-01\n2024-04-01\n"),
            InputError::EmptyDateRange { .. }
        ));
        assert_eq!(input_error("AAPL\n"), InputError::UnexpectedEof);
        assert_eq!(
            input_error("AAPL/x\n\n\n"),
            InputError::InvalidTicker("AAPL/X".into())
        );
    }

    #[test]
    fn welcome_lists_periods() {
        let mut out = Vec::new();
        Prompter::new(Cursor::new(&b""[..]), &mut out, today())
            .welcome()
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("AAPL (Apple Inc)"));
        assert!(text.contains("1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max"));
    }
}
