//! Market scanner integration tests against in-memory providers

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use streak_odds::feed::{FeedError, Granularity, Lookback, MarketCapProvider, PriceHistoryProvider};
use streak_odds::scanner::{
    FailureReason, MarketScanner, ScanConfig, ScanMode, ScanReport,
};
use streak_odds::streak::{PricePoint, Probability, StreakAnalyzer};
use streak_odds::universe::{StaticUniverse, UniverseProvider};

#[derive(Default)]
struct MemoryFeed {
    closes: HashMap<String, Vec<Decimal>>,
    caps: HashMap<String, Decimal>,
    broken_caps: Vec<String>,
}

impl MemoryFeed {
    fn insert(&mut self, symbol: &str, closes: Vec<Decimal>, cap: Option<Decimal>) {
        self.closes.insert(symbol.to_string(), closes);
        if let Some(cap) = cap {
            self.caps.insert(symbol.to_string(), cap);
        }
    }

    fn points(&self, symbol: &str) -> Vec<PricePoint> {
        to_points(&self.closes[symbol])
    }
}

fn to_points(closes: &[Decimal]) -> Vec<PricePoint> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(base + Duration::days(i as i64), c))
        .collect()
}

#[async_trait]
impl PriceHistoryProvider for MemoryFeed {
    async fn fetch_prices(
        &self,
        symbol: &str,
        _granularity: Granularity,
        _lookback: Lookback,
    ) -> Result<Vec<PricePoint>, FeedError> {
        match self.closes.get(symbol) {
            Some(closes) => Ok(to_points(closes)),
            None => Err(FeedError::unavailable(symbol, "symbol may be delisted")),
        }
    }
}

#[async_trait]
impl MarketCapProvider for MemoryFeed {
    async fn fetch_market_cap(&self, symbol: &str) -> Result<Option<Decimal>, FeedError> {
        if self.broken_caps.iter().any(|s| s == symbol) {
            return Err(FeedError::unavailable(symbol, "quote endpoint down"));
        }
        Ok(self.caps.get(symbol).copied())
    }
}

/// Moves: U U D U U U D D U U (current up 2; history up [2, 3], down [1, 2])
fn mixed() -> Vec<Decimal> {
    [100, 101, 102, 101, 102, 103, 104, 103, 103, 104, 105]
        .into_iter()
        .map(Decimal::from)
        .collect()
}

/// Moves: D U D U D U D U D U (current up 1; history up [1,1,1,1], never extended)
fn zigzag() -> Vec<Decimal> {
    [50, 49, 50, 49, 50, 49, 50, 49, 50, 49, 50]
        .into_iter()
        .map(Decimal::from)
        .collect()
}

/// Moves: U U U U U U U U U U (no completed history)
fn rising() -> Vec<Decimal> {
    (10..=20).map(Decimal::from).collect()
}

fn config(mode: ScanMode, min_pct: Decimal) -> ScanConfig {
    ScanConfig {
        mode,
        min_probability_pct: min_pct,
        ..ScanConfig::default()
    }
}

async fn run(feed: MemoryFeed, symbols: &[&str], config: &ScanConfig) -> ScanReport {
    let feed = Arc::new(feed);
    let scanner = MarketScanner::new(feed.clone(), feed);
    let symbols: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
    scanner.scan(&symbols, config).await.unwrap()
}

fn names(report: &ScanReport) -> Vec<&str> {
    report.results.iter().map(|r| r.symbol.as_str()).collect()
}

#[tokio::test]
async fn test_one_failure_of_three_matches_independent_analysis() {
    let mut feed = MemoryFeed::default();
    feed.insert("AAA", mixed(), Some(dec!(500)));
    feed.insert("CCC", zigzag(), Some(dec!(900)));
    let expected_a = StreakAnalyzer::default().analyze(&feed.points("AAA")).unwrap();
    let expected_c = StreakAnalyzer::default().analyze(&feed.points("CCC")).unwrap();

    let report = run(feed, &["AAA", "BBB", "CCC"], &config(ScanMode::Both, Decimal::ZERO)).await;

    assert_eq!(report.total, 3);
    assert_eq!(names(&report), vec!["CCC", "AAA"]);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failures[0].symbol, "BBB");
    assert!(matches!(
        &report.failures[0].reason,
        FailureReason::DataUnavailable { message } if message.contains("delisted")
    ));

    let c = &report.results[0];
    assert_eq!(c.next, expected_c.next);
    assert_eq!(c.after_next, expected_c.after_next);
    assert_eq!(c.current, expected_c.current);
    assert_eq!(c.last_price, dec!(50));

    let a = &report.results[1];
    assert_eq!(a.next, expected_a.next);
    assert_eq!(a.current, expected_a.current);
}

fn three_shapes() -> MemoryFeed {
    let mut feed = MemoryFeed::default();
    feed.insert("MIX", mixed(), None);
    feed.insert("ZIG", zigzag(), None);
    feed.insert("NEW", rising(), None);
    feed
}

#[tokio::test]
async fn test_threshold_zero_keeps_every_analyzed_instrument() {
    for mode in [ScanMode::UpsideOnly, ScanMode::DownsideOnly, ScanMode::Both] {
        let report = run(
            three_shapes(),
            &["MIX", "ZIG", "NEW"],
            &config(mode, Decimal::ZERO),
        )
        .await;
        assert_eq!(report.results.len(), 3, "mode {}", mode);
        assert!(report.filtered.is_empty());
    }
}

#[tokio::test]
async fn test_threshold_hundred_keeps_only_certainty() {
    let report = run(
        three_shapes(),
        &["MIX", "ZIG", "NEW"],
        &config(ScanMode::DownsideOnly, dec!(100)),
    )
    .await;

    // zigzag up streaks never extended: down is 100%
    assert_eq!(names(&report), vec!["ZIG"]);
    assert_eq!(
        report.results[0].next.down,
        Probability::Defined(Decimal::ONE)
    );
    assert_eq!(report.filtered.len(), 2);
}

#[tokio::test]
async fn test_equal_market_caps_keep_input_order() {
    let mut feed = MemoryFeed::default();
    for symbol in ["D", "B", "A", "C"] {
        feed.insert(symbol, mixed(), Some(dec!(100)));
    }
    feed.insert("BIG", mixed(), Some(dec!(1000)));

    let report = run(
        feed,
        &["D", "B", "BIG", "A", "C"],
        &ScanConfig {
            concurrency: 3,
            ..config(ScanMode::Both, Decimal::ZERO)
        },
    )
    .await;
    assert_eq!(names(&report), vec!["BIG", "D", "B", "A", "C"]);
}

#[tokio::test]
async fn test_market_cap_failure_sorts_last() {
    let mut feed = MemoryFeed::default();
    feed.insert("FLAKY", mixed(), Some(dec!(10000)));
    feed.insert("SMALL", mixed(), Some(dec!(1)));
    feed.broken_caps.push("FLAKY".to_string());

    let report = run(feed, &["FLAKY", "SMALL"], &config(ScanMode::Both, Decimal::ZERO)).await;
    assert_eq!(names(&report), vec!["SMALL", "FLAKY"]);
    assert!(report.results[1].market_cap.is_none());
    assert_eq!(report.failure_count(), 0);
}

#[tokio::test]
async fn test_every_symbol_accounted_for() {
    let mut feed = MemoryFeed::default();
    feed.insert("MIX", mixed(), Some(dec!(3)));
    feed.insert("ZIG", zigzag(), Some(dec!(2)));
    feed.insert("SHORT", vec![dec!(1), dec!(2)], Some(dec!(1)));

    let report = run(
        feed,
        &["MIX", "ZIG", "SHORT", "GONE"],
        &config(ScanMode::UpsideOnly, dec!(40)),
    )
    .await;

    assert_eq!(
        report.results.len() + report.filtered.len() + report.failure_count() + report.skipped,
        report.total
    );
    // MIX next up 50%, ZIG next up 0%
    assert_eq!(names(&report), vec!["MIX"]);
    assert_eq!(report.filtered[0].symbol, "ZIG");
    assert_eq!(report.failure_count(), 2);
}

#[tokio::test]
async fn test_scan_from_universe() {
    let mut feed = MemoryFeed::default();
    feed.insert("AAPL", mixed(), Some(dec!(3)));
    feed.insert("MSFT", zigzag(), Some(dec!(4)));

    let symbols = StaticUniverse::parse("aapl, msft, aapl").symbols().await.unwrap();
    let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
    let report = run(feed, &symbols, &config(ScanMode::Both, dec!(50))).await;

    assert_eq!(names(&report), vec!["MSFT", "AAPL"]);
    assert!(report.results[0].qualified.downside);
    assert!(!report.results[0].qualified.upside);
    assert!(report.results[1].qualified.upside && report.results[1].qualified.downside);
}
