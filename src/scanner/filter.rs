//! Probability threshold filter

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{QualifiedSides, ScanMode};
use crate::streak::{DirectionalOdds, Probability};

/// Result of applying the threshold to an instrument's next-period odds
#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    /// At least one checked side cleared the threshold
    Pass(QualifiedSides),
    /// Nothing cleared
    Reject(RejectReason),
}

/// Reason for rejecting an analyzed instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// Best checked probability, in percent, was below the threshold
    BelowThreshold { best_pct: Decimal },
    /// No checked side had any history to condition on
    NoHistory,
}

/// Keeps instruments whose next-period probability reaches a minimum
///
/// A zero threshold disables filtering, so every analyzed instrument passes
/// with all checked sides marked, including ones without history. Any
/// positive threshold needs a defined probability.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdFilter {
    mode: ScanMode,
    min_pct: Decimal,
}

impl ThresholdFilter {
    pub fn new(mode: ScanMode, min_pct: Decimal) -> Self {
        Self { mode, min_pct }
    }

    fn clears(&self, probability: Probability) -> bool {
        if self.min_pct.is_zero() {
            return true;
        }
        probability.percent().is_some_and(|pct| pct >= self.min_pct)
    }

    pub fn apply(&self, odds: &DirectionalOdds) -> FilterResult {
        let qualified = QualifiedSides {
            upside: self.mode.checks_upside() && self.clears(odds.up),
            downside: self.mode.checks_downside() && self.clears(odds.down),
        };

        if qualified.any() {
            return FilterResult::Pass(qualified);
        }

        let up = odds.up.percent().filter(|_| self.mode.checks_upside());
        let down = odds.down.percent().filter(|_| self.mode.checks_downside());
        match up.max(down) {
            Some(best_pct) => FilterResult::Reject(RejectReason::BelowThreshold { best_pct }),
            None => FilterResult::Reject(RejectReason::NoHistory),
        }
    }
}
