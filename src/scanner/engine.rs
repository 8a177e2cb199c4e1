//! Market scanner
//!
//! Runs the streak analyzer over many instruments with bounded concurrency.
//! Every instrument ends up as exactly one outcome; nothing a provider does
//! can abort the batch.

use futures_util::{stream, StreamExt};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;

use super::filter::{FilterResult, ThresholdFilter};
use super::progress::{ScanProgress, StopHandle};
use super::types::{
    FailureReason, FilteredOut, InstrumentOutcome, ScanConfig, ScanError, ScanFailure, ScanReport,
    ScanResult,
};
use crate::feed::{MarketCapProvider, PriceHistoryProvider};
use crate::streak::{AnalysisError, PricePoint, StreakAnalyzer};
use crate::telemetry::{
    increment_counter, record_latency, CounterMetric, LatencyMetric,
};

/// Batch scanner over a price source and a market-cap source
pub struct MarketScanner {
    prices: Arc<dyn PriceHistoryProvider>,
    market_caps: Arc<dyn MarketCapProvider>,
    progress: Arc<ScanProgress>,
    stop: StopHandle,
}

impl MarketScanner {
    pub fn new(
        prices: Arc<dyn PriceHistoryProvider>,
        market_caps: Arc<dyn MarketCapProvider>,
    ) -> Self {
        Self {
            prices,
            market_caps,
            progress: Arc::new(ScanProgress::new()),
            stop: StopHandle::new(),
        }
    }

    /// Shared progress counters for the current scan
    pub fn progress(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    /// Handle that stops the scan once in-flight instruments finish
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Scan `symbols` and return retained results, filtered instruments and failures
    pub async fn scan(
        &self,
        symbols: &[String],
        config: &ScanConfig,
    ) -> Result<ScanReport, ScanError> {
        if symbols.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }
        config.validate()?;

        let started_at = chrono::Utc::now();
        let start = Instant::now();
        self.progress.start(symbols.len());

        tracing::info!(
            instruments = symbols.len(),
            mode = %config.mode,
            min_probability_pct = %config.min_probability_pct,
            interval = %config.granularity,
            lookback_days = config.lookback.as_days(),
            concurrency = config.concurrency,
            "Starting scan"
        );

        let analyzer = StreakAnalyzer::new(config.history_policy);
        let filter = ThresholdFilter::new(config.mode, config.min_probability_pct);

        // buffered keeps input order, so ties in the final sort stay stable
        let outcomes: Vec<InstrumentOutcome> = stream::iter(symbols)
            .map(|symbol| self.scan_one(symbol, config, &analyzer, &filter))
            .buffered(config.concurrency)
            .collect()
            .await;

        let report = ScanReport::from_outcomes(config, outcomes, started_at);
        record_latency(LatencyMetric::Scan, start.elapsed());

        tracing::info!(
            scan_id = %report.id,
            retained = report.results.len(),
            filtered = report.filtered.len(),
            failed = report.failure_count(),
            skipped = report.skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scan complete"
        );

        Ok(report)
    }

    async fn scan_one(
        &self,
        symbol: &str,
        config: &ScanConfig,
        analyzer: &StreakAnalyzer,
        filter: &ThresholdFilter,
    ) -> InstrumentOutcome {
        let outcome = if self.stop.is_stopped() {
            increment_counter(CounterMetric::InstrumentsSkipped);
            InstrumentOutcome::Skipped(symbol.to_string())
        } else {
            self.fetch_and_evaluate(symbol, config, analyzer, filter)
                .await
        };

        if let InstrumentOutcome::Failed(failure) = &outcome {
            increment_counter(CounterMetric::ScanFailures);
            tracing::warn!(symbol, reason = %failure.reason, "Instrument failed");
        }
        self.progress.record(&outcome);
        outcome
    }

    async fn fetch_and_evaluate(
        &self,
        symbol: &str,
        config: &ScanConfig,
        analyzer: &StreakAnalyzer,
        filter: &ThresholdFilter,
    ) -> InstrumentOutcome {
        let start = Instant::now();
        let fetch = async {
            tokio::join!(
                self.prices
                    .fetch_prices(symbol, config.granularity, config.lookback),
                self.market_caps.fetch_market_cap(symbol),
            )
        };

        match tokio::time::timeout(config.fetch_timeout, fetch).await {
            Err(_) => InstrumentOutcome::Failed(ScanFailure::new(
                symbol,
                FailureReason::Timeout {
                    after: config.fetch_timeout,
                },
            )),
            Ok((Err(e), _)) => InstrumentOutcome::Failed(ScanFailure::new(
                symbol,
                FailureReason::DataUnavailable {
                    message: e.to_string(),
                },
            )),
            Ok((Ok(prices), market_cap)) => {
                record_latency(LatencyMetric::PriceFetch, start.elapsed());
                let market_cap = market_cap.unwrap_or_else(|e| {
                    tracing::warn!(symbol, error = %e, "Market cap unavailable, sorting last");
                    None
                });
                evaluate(symbol, &prices, market_cap, config, analyzer, filter)
            }
        }
    }
}

/// Analyze a fetched series and apply the threshold
fn evaluate(
    symbol: &str,
    prices: &[PricePoint],
    market_cap: Option<Decimal>,
    config: &ScanConfig,
    analyzer: &StreakAnalyzer,
    filter: &ThresholdFilter,
) -> InstrumentOutcome {
    let required = config.required_points();
    if prices.len() < required {
        return InstrumentOutcome::Failed(ScanFailure::new(
            symbol,
            FailureReason::InsufficientData {
                got: prices.len(),
                required,
            },
        ));
    }

    let start = Instant::now();
    let analysis = match analyzer.analyze(prices) {
        Ok(analysis) => analysis,
        Err(AnalysisError::InsufficientData { got }) => {
            return InstrumentOutcome::Failed(ScanFailure::new(
                symbol,
                FailureReason::InsufficientData { got, required },
            ))
        }
        Err(e) => {
            return InstrumentOutcome::Failed(ScanFailure::new(
                symbol,
                FailureReason::DataUnavailable {
                    message: e.to_string(),
                },
            ))
        }
    };
    record_latency(LatencyMetric::Analysis, start.elapsed());
    increment_counter(CounterMetric::InstrumentsAnalyzed);

    tracing::debug!(
        symbol,
        current = %analysis.current,
        next_up = %analysis.next.up,
        next_down = %analysis.next.down,
        "Instrument analyzed"
    );

    match filter.apply(&analysis.next) {
        FilterResult::Pass(qualified) => {
            increment_counter(CounterMetric::ResultsRetained);
            InstrumentOutcome::Analyzed(ScanResult::from_analysis(
                symbol, &analysis, market_cap, qualified,
            ))
        }
        FilterResult::Reject(reason) => InstrumentOutcome::Filtered(FilteredOut {
            symbol: symbol.to_string(),
            reason,
        }),
    }
}
