//! Prometheus metrics
//!
//! Thin wrappers over the `metrics` facade. Without an installed recorder
//! (metrics port unset, unit tests) every call is a no-op.

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Price history request
    PriceFetch,
    /// Streak analysis of one series
    Analysis,
    /// Whole scan, start to report
    Scan,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Instruments in the running scan
    ScanTotal,
    /// Instruments finished in the running scan
    ScanCompleted,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Instruments that reached analysis
    InstrumentsAnalyzed,
    /// Instruments that passed the threshold
    ResultsRetained,
    /// Fetch, timeout or data-length failures
    ScanFailures,
    /// Instruments skipped after a stop request
    InstrumentsSkipped,
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::PriceFetch => "streak_odds_price_fetch_latency_ms",
        LatencyMetric::Analysis => "streak_odds_analysis_latency_ms",
        LatencyMetric::Scan => "streak_odds_scan_duration_ms",
    };

    ::metrics::histogram!(metric_name).record(duration.as_secs_f64() * 1000.0);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::ScanTotal => "streak_odds_scan_instruments_total",
        GaugeMetric::ScanCompleted => "streak_odds_scan_instruments_completed",
    };

    ::metrics::gauge!(metric_name).set(value);
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric) {
    let metric_name = match metric {
        CounterMetric::InstrumentsAnalyzed => "streak_odds_instruments_analyzed_total",
        CounterMetric::ResultsRetained => "streak_odds_results_retained_total",
        CounterMetric::ScanFailures => "streak_odds_scan_failures_total",
        CounterMetric::InstrumentsSkipped => "streak_odds_instruments_skipped_total",
    };

    ::metrics::counter!(metric_name).increment(1);
}
