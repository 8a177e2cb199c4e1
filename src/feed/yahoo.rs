//! Yahoo Finance client for close prices and market capitalization
//!
//! Uses the public chart endpoint for bars and the quote endpoint for market
//! cap. Bars with a null close (halted or partial sessions) are dropped.

use super::{FeedError, Granularity, Lookback, MarketCapProvider, PriceHistoryProvider};
use crate::streak::PricePoint;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance API base URL
pub const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

/// Configuration for the Yahoo client
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO_API_URL.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: concat!("streak-odds/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP client for Yahoo Finance
pub struct YahooClient {
    config: YahooConfig,
    client: Client,
}

impl YahooClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, FeedError> {
        Self::with_config(YahooConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: YahooConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.config.base_url, symbol)
    }

    fn quote_url(&self) -> String {
        format!("{}/v7/finance/quote", self.config.base_url)
    }

    /// GET `url` and return the body, mapping non-2xx responses to `DataUnavailable`
    async fn get_text(
        &self,
        symbol: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, FeedError> {
        tracing::debug!(url = %url, symbol, "Requesting Yahoo Finance");

        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::unavailable(
                symbol,
                format!("Yahoo API error: {} - {}", status, truncate(&body, 200)),
            ));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooClient {
    async fn fetch_prices(
        &self,
        symbol: &str,
        granularity: Granularity,
        lookback: Lookback,
    ) -> Result<Vec<PricePoint>, FeedError> {
        let url = self.chart_url(symbol);
        let range = lookback.range();
        let body = self
            .get_text(
                symbol,
                &url,
                &[
                    ("range", range.as_str()),
                    ("interval", granularity.as_str()),
                    ("includePrePost", "false"),
                ],
            )
            .await?;

        let prices = parse_chart(symbol, &body)?;

        tracing::debug!(
            symbol,
            interval = %granularity,
            range = %range,
            bars = prices.len(),
            "Fetched price history"
        );

        Ok(prices)
    }
}

#[async_trait]
impl MarketCapProvider for YahooClient {
    async fn fetch_market_cap(&self, symbol: &str) -> Result<Option<Decimal>, FeedError> {
        let url = self.quote_url();
        let body = self.get_text(symbol, &url, &[("symbols", symbol)]).await?;
        parse_market_cap(symbol, &body)
    }
}

/// Chart endpoint envelope
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    /// Bar open times (unix seconds)
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Quote endpoint envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    quote_response: QuoteBody,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    #[serde(default)]
    result: Vec<QuoteResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResult {
    symbol: String,
    market_cap: Option<f64>,
}

/// Parse a chart response into price points, dropping null or non-positive closes
fn parse_chart(symbol: &str, body: &str) -> Result<Vec<PricePoint>, FeedError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| FeedError::unavailable(symbol, format!("malformed chart response: {}", e)))?;

    if let Some(error) = response.chart.error {
        return Err(FeedError::unavailable(
            symbol,
            format!(
                "{}: {}",
                error.code,
                error.description.unwrap_or_default()
            ),
        ));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| FeedError::unavailable(symbol, "no data returned"))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let prices: Vec<PricePoint> = timestamps
        .into_iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close.filter(|c| c.is_finite() && *c > 0.0)?;
            let timestamp = Utc.timestamp_opt(ts, 0).single()?;
            let close = Decimal::try_from(close).ok()?;
            Some(PricePoint::new(timestamp, close))
        })
        .collect();

    if prices.is_empty() {
        return Err(FeedError::unavailable(symbol, "no data returned"));
    }

    Ok(prices)
}

/// Parse a quote response, matching the requested symbol case-insensitively
fn parse_market_cap(symbol: &str, body: &str) -> Result<Option<Decimal>, FeedError> {
    let response: QuoteResponse = serde_json::from_str(body)
        .map_err(|e| FeedError::unavailable(symbol, format!("malformed quote response: {}", e)))?;

    Ok(response
        .quote_response
        .result
        .into_iter()
        .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
        .and_then(|q| q.market_cap)
        .and_then(|cap| Decimal::try_from(cap).ok()))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_yahoo_client_creation() {
        let client = YahooClient::new().unwrap();
        assert_eq!(client.config.base_url, YAHOO_API_URL);
    }

    #[test]
    fn test_yahoo_config_default() {
        let config = YahooConfig::default();
        assert_eq!(config.base_url, YAHOO_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.user_agent.starts_with("streak-odds/"));
    }

    #[test]
    fn test_urls() {
        let client = YahooClient::with_config(YahooConfig {
            base_url: "http://localhost:9999".to_string(),
            ..YahooConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.chart_url("AAPL"),
            "http://localhost:9999/v8/finance/chart/AAPL"
        );
        assert_eq!(client.quote_url(), "http://localhost:9999/v7/finance/quote");
    }

    #[test]
    fn test_parse_chart() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAPL", "currency": "USD"},
                    "timestamp": [1704067200, 1704153600, 1704240000, 1704326400],
                    "indicators": {"quote": [{"close": [185.5, null, 184.25, 186.0]}]}
                }],
                "error": null
            }
        }"#;

        let prices = parse_chart("AAPL", body).unwrap();
        assert_eq!(prices.len(), 3);
        assert_eq!(prices[0].close, dec!(185.5));
        assert_eq!(prices[1].close, dec!(184.25));
        assert_eq!(prices[2].timestamp.timestamp(), 1704326400);
    }

    #[test]
    fn test_parse_chart_api_error() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;

        let err = parse_chart("ZZZZ", body).unwrap_err();
        assert!(matches!(err, FeedError::DataUnavailable { .. }));
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn test_parse_chart_empty_result() {
        let body = r#"{"chart": {"result": [], "error": null}}"#;
        assert!(matches!(
            parse_chart("AAPL", body),
            Err(FeedError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_parse_chart_all_null_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704067200, 1704153600],
                    "indicators": {"quote": [{"close": [null, null]}]}
                }],
                "error": null
            }
        }"#;
        assert!(parse_chart("AAPL", body).is_err());
    }

    #[test]
    fn test_parse_chart_invalid_json() {
        let err = parse_chart("AAPL", "not json").unwrap_err();
        assert!(err.to_string().contains("malformed chart response"));
    }

    #[test]
    fn test_parse_market_cap() {
        let body = r#"{
            "quoteResponse": {
                "result": [{"symbol": "MSFT", "marketCap": 3100000000000}],
                "error": null
            }
        }"#;
        let cap = parse_market_cap("msft", body).unwrap();
        assert_eq!(cap, Some(dec!(3100000000000)));
    }

    #[test]
    fn test_parse_market_cap_missing() {
        let body = r#"{"quoteResponse": {"result": [{"symbol": "SPY"}], "error": null}}"#;
        assert_eq!(parse_market_cap("SPY", body).unwrap(), None);

        let body = r#"{"quoteResponse": {"result": [], "error": null}}"#;
        assert_eq!(parse_market_cap("SPY", body).unwrap(), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
