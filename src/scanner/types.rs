//! Scanner types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use super::filter::RejectReason;
use crate::feed::{Granularity, Lookback};
use crate::streak::{AfterNext, Analysis, CurrentStreak, DirectionalOdds, HistoryPolicy};

/// Which next-period probability a scan filters on
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// Probability of an up close
    UpsideOnly,
    /// Probability of a down close
    DownsideOnly,
    /// Either side
    #[default]
    Both,
}

impl ScanMode {
    pub fn checks_upside(&self) -> bool {
        matches!(self, ScanMode::UpsideOnly | ScanMode::Both)
    }

    pub fn checks_downside(&self) -> bool {
        matches!(self, ScanMode::DownsideOnly | ScanMode::Both)
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::UpsideOnly => write!(f, "upside-only"),
            ScanMode::DownsideOnly => write!(f, "downside-only"),
            ScanMode::Both => write!(f, "both"),
        }
    }
}

/// Scan errors
#[derive(Debug, Error, PartialEq)]
pub enum ScanError {
    #[error("No instruments to scan")]
    EmptyUniverse,
    #[error("Minimum probability must be between 0 and 100, got {0}")]
    InvalidThreshold(Decimal),
    #[error("Concurrency must be at least 1")]
    InvalidConcurrency,
}

/// Parameters for one scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub granularity: Granularity,
    pub lookback: Lookback,
    pub mode: ScanMode,
    /// Minimum qualifying probability, in percent
    pub min_probability_pct: Decimal,
    /// Instruments fetched at once
    pub concurrency: usize,
    /// Budget for fetching one instrument's prices and market cap
    pub fetch_timeout: Duration,
    /// Shorter series are recorded as failures without analysis
    pub min_data_points: usize,
    pub history_policy: HistoryPolicy,
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.min_probability_pct < Decimal::ZERO || self.min_probability_pct > dec!(100) {
            return Err(ScanError::InvalidThreshold(self.min_probability_pct));
        }
        if self.concurrency == 0 {
            return Err(ScanError::InvalidConcurrency);
        }
        Ok(())
    }

    /// Analysis needs two closes whatever the configured minimum
    pub fn required_points(&self) -> usize {
        self.min_data_points.max(2)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::OneDay,
            lookback: Lookback::default(),
            mode: ScanMode::Both,
            min_probability_pct: dec!(60),
            concurrency: 4,
            fetch_timeout: Duration::from_secs(30),
            min_data_points: 10,
            history_policy: HistoryPolicy::default(),
        }
    }
}

/// Sides that cleared the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QualifiedSides {
    pub upside: bool,
    pub downside: bool,
}

impl QualifiedSides {
    pub fn any(&self) -> bool {
        self.upside || self.downside
    }
}

impl fmt::Display for QualifiedSides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.upside, self.downside) {
            (true, true) => write!(f, "up+down"),
            (true, false) => write!(f, "up"),
            (false, true) => write!(f, "down"),
            (false, false) => write!(f, "-"),
        }
    }
}

/// An instrument that passed the filter
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub symbol: String,
    pub last_price: Decimal,
    pub last_change_pct: Option<Decimal>,
    pub current: CurrentStreak,
    pub next: DirectionalOdds,
    pub after_next: AfterNext,
    /// `None` when the provider had no figure
    pub market_cap: Option<Decimal>,
    pub qualified: QualifiedSides,
    pub price_count: usize,
}

impl ScanResult {
    pub fn from_analysis(
        symbol: &str,
        analysis: &Analysis,
        market_cap: Option<Decimal>,
        qualified: QualifiedSides,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            last_price: analysis.last_close,
            last_change_pct: analysis.last_change_pct,
            current: analysis.current,
            next: analysis.next,
            after_next: analysis.after_next,
            market_cap,
            qualified,
            price_count: analysis.price_count,
        }
    }

    /// Highest next-period probability among the qualifying sides, in percent
    pub fn qualifying_pct(&self) -> Option<Decimal> {
        let up = self.next.up.percent().filter(|_| self.qualified.upside);
        let down = self.next.down.percent().filter(|_| self.qualified.downside);
        up.max(down)
    }
}

/// Why an instrument produced no result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    DataUnavailable { message: String },
    Timeout { after: Duration },
    InsufficientData { got: usize, required: usize },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::DataUnavailable { message } => write!(f, "{}", message),
            FailureReason::Timeout { after } => {
                write!(f, "timed out after {}s", after.as_secs_f64())
            }
            FailureReason::InsufficientData { got, required } => {
                write!(f, "insufficient data: {} prices, need {}", got, required)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanFailure {
    pub symbol: String,
    pub reason: FailureReason,
}

impl ScanFailure {
    pub fn new(symbol: &str, reason: FailureReason) -> Self {
        Self {
            symbol: symbol.to_string(),
            reason,
        }
    }
}

/// An analyzed instrument that did not clear the threshold
#[derive(Debug, Clone, Serialize)]
pub struct FilteredOut {
    pub symbol: String,
    pub reason: RejectReason,
}

/// Outcome of one instrument's scan step
#[derive(Debug, Clone)]
pub enum InstrumentOutcome {
    Analyzed(ScanResult),
    Filtered(FilteredOut),
    Failed(ScanFailure),
    /// Not started because the scan was stopped
    Skipped(String),
}

/// Everything a scan produced
///
/// Each input symbol lands in exactly one of `results`, `filtered`,
/// `failures` or the skipped count.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub id: Uuid,
    pub mode: ScanMode,
    pub min_probability_pct: Decimal,
    /// Retained instruments, market cap descending, unknown caps last
    pub results: Vec<ScanResult>,
    pub filtered: Vec<FilteredOut>,
    pub failures: Vec<ScanFailure>,
    pub skipped: usize,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanReport {
    /// Assemble a report from per-instrument outcomes in input order
    pub fn from_outcomes(
        config: &ScanConfig,
        outcomes: Vec<InstrumentOutcome>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let total = outcomes.len();
        let mut results = Vec::new();
        let mut filtered = Vec::new();
        let mut failures = Vec::new();
        let mut skipped = 0;

        for outcome in outcomes {
            match outcome {
                InstrumentOutcome::Analyzed(result) => results.push(result),
                InstrumentOutcome::Filtered(out) => filtered.push(out),
                InstrumentOutcome::Failed(failure) => failures.push(failure),
                InstrumentOutcome::Skipped(_) => skipped += 1,
            }
        }

        // stable: equal caps keep input order
        results.sort_by(|a, b| by_market_cap_desc(a.market_cap, b.market_cap));

        Self {
            id: Uuid::new_v4(),
            mode: config.mode,
            min_probability_pct: config.min_probability_pct,
            results,
            filtered,
            failures,
            skipped,
            total,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Instruments that were fetched and analyzed, whether retained or not
    pub fn analyzed_count(&self) -> usize {
        self.results.len() + self.filtered.len()
    }

    pub fn was_stopped(&self) -> bool {
        self.skipped > 0
    }

    /// The `n` results with the highest qualifying probability
    pub fn top(&self, n: usize) -> Vec<&ScanResult> {
        let mut ranked: Vec<&ScanResult> = self.results.iter().collect();
        ranked.sort_by(|a, b| match (a.qualifying_pct(), b.qualifying_pct()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        ranked.truncate(n);
        ranked
    }
}

fn by_market_cap_desc(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
