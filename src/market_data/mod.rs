pub mod fetcher;
pub mod series;
pub mod yahoo;

// Re-export the series types for convenient access (e.g. `use crate::market_data::PriceSeries`).
pub use fetcher::SeriesFetcher;
pub use series::{PriceBar, PriceSeries, SeriesError};
pub use yahoo::YahooClient;
