use anyhow::Result;

use crate::market_data::PriceSeries;
use crate::types::FetchRange;

/// Source of daily price history.
///
/// An unknown ticker or a range with no sessions yields `Ok` with an empty
/// series; `Err` is reserved for transport and decoding failures.
#[allow(async_fn_in_trait)]
pub trait SeriesFetcher {
    async fn fetch(&self, ticker: &str, range: FetchRange) -> Result<PriceSeries>;
}

impl<T: SeriesFetcher + ?Sized> SeriesFetcher for &T {
    async fn fetch(&self, ticker: &str, range: FetchRange) -> Result<PriceSeries> {
        (**self).fetch(ticker, range).await
    }
}
