//! Price feed module
//!
//! Historical close prices and market capitalization from an external data
//! source. The scanner only sees the traits; `YahooClient` is the HTTP
//! implementation used by the binary.

mod types;
mod yahoo;

pub use types::{FeedError, Granularity, Lookback, LookbackNote};
pub use yahoo::{YahooClient, YahooConfig, YAHOO_API_URL};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::streak::PricePoint;

/// Source of historical close prices
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetch chronologically ordered closes for `symbol`
    async fn fetch_prices(
        &self,
        symbol: &str,
        granularity: Granularity,
        lookback: Lookback,
    ) -> Result<Vec<PricePoint>, FeedError>;
}

/// Source of market capitalization figures
#[async_trait]
pub trait MarketCapProvider: Send + Sync {
    /// Current market capitalization, `Ok(None)` when the provider has no figure
    async fn fetch_market_cap(&self, symbol: &str) -> Result<Option<Decimal>, FeedError>;
}
