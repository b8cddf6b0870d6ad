use chrono::NaiveDate;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single daily OHLCV record.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// A derived column aligned one-to-one with the bars. `None` marks positions
/// where the indicator has insufficient history.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl IndicatorColumn {
    /// Number of leading `None` entries.
    pub fn undefined_prefix(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }

    /// Most recent defined value.
    pub fn last_defined(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar dates must be strictly increasing: {prev} is followed by {next}")]
    Unordered { prev: NaiveDate, next: NaiveDate },
    #[error("column '{name}' has {got} values but the series has {expected} bars")]
    LengthMismatch {
        name: String,
        got: usize,
        expected: usize,
    },
    #[error("column '{0}' already exists")]
    DuplicateColumn(String),
}

// ---------------------------------------------------------------------------
// PriceSeries -- ordered bars plus appended indicator columns
// ---------------------------------------------------------------------------

/// Time-ordered daily price history for one ticker.
///
/// Dates are unique and strictly ascending; every indicator column has
/// exactly one entry per bar. Both invariants are checked on insertion so
/// downstream stages never need to re-validate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
    columns: Vec<IndicatorColumn>,
}

impl PriceSeries {
    /// Build a series from bars that are already in ascending date order.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        if let Some(w) = bars.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(SeriesError::Unordered {
                prev: w[0].date,
                next: w[1].date,
            });
        }
        Ok(Self {
            bars,
            columns: Vec::new(),
        })
    }

    /// Build a series from provider rows in arbitrary order.
    ///
    /// Rows are sorted by date; when two rows share a date the one that came
    /// later in the input wins (providers append the in-progress session last).
    pub fn from_unordered(mut bars: Vec<PriceBar>) -> Self {
        // Stable sort keeps input order among equal dates.
        bars.sort_by_key(|b| b.date);
        let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match out.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => out.push(bar),
            }
        }
        Self {
            bars: out,
            columns: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn columns(&self) -> &[IndicatorColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&IndicatorColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Append a derived column. Insertion order is preserved for export.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), SeriesError> {
        let name = name.into();
        if values.len() != self.bars.len() {
            return Err(SeriesError::LengthMismatch {
                name,
                got: values.len(),
                expected: self.bars.len(),
            });
        }
        if self.column(&name).is_some() {
            return Err(SeriesError::DuplicateColumn(name));
        }
        self.columns.push(IndicatorColumn { name, values });
        Ok(())
    }
}
