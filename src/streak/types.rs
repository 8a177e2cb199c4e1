//! Streak analysis types
//!
//! Value types shared by the segmenter, the distribution statistics and the analyzer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Direction of a single period's move relative to the previous close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Close strictly above the previous close
    Up,
    /// Close at or below the previous close
    Down,
}

impl Direction {
    /// Both directions, up first
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];

    /// Classify the move from `previous` to `current`.
    ///
    /// An unchanged close is a `Down` move.
    pub fn between(previous: Decimal, current: Decimal) -> Self {
        if current > previous {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// The opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A single closing price observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Bar timestamp
    pub timestamp: DateTime<Utc>,
    /// Closing price
    pub close: Decimal,
}

impl PricePoint {
    /// Create a new price point
    pub fn new(timestamp: DateTime<Utc>, close: Decimal) -> Self {
        Self { timestamp, close }
    }
}

/// A maximal run of identical moves
///
/// `start` and `end` are inclusive indices into the move sequence, so move `i`
/// compares price `i + 1` against price `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub direction: Direction,
    pub length: usize,
    pub start: usize,
    pub end: usize,
}

/// The trailing streak ending at the most recent close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStreak {
    pub direction: Direction,
    pub length: usize,
}

impl From<&Streak> for CurrentStreak {
    fn from(streak: &Streak) -> Self {
        Self {
            direction: streak.direction,
            length: streak.length,
        }
    }
}

impl fmt::Display for CurrentStreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} consecutive {} period(s)", self.length, self.direction)
    }
}

/// An empirical probability, or the absence of any precedent to compute one
///
/// `Undefined` never compares or renders as a number, so an instrument without
/// history cannot pass for a 0% or 100% one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Probability {
    /// Frequency in `[0, 1]`
    Defined(Decimal),
    /// No historical observation to condition on
    Undefined,
}

impl Probability {
    /// `numerator / denominator`, undefined when the denominator is zero
    pub fn ratio(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            return Probability::Undefined;
        }
        Probability::Defined(Decimal::from(numerator) / Decimal::from(denominator))
    }

    /// `1 - p`
    pub fn complement(self) -> Self {
        match self {
            Probability::Defined(p) => Probability::Defined(Decimal::ONE - p),
            Probability::Undefined => Probability::Undefined,
        }
    }

    /// The frequency, if defined
    pub fn value(self) -> Option<Decimal> {
        match self {
            Probability::Defined(p) => Some(p),
            Probability::Undefined => None,
        }
    }

    /// The frequency scaled to `[0, 100]`, if defined
    pub fn percent(self) -> Option<Decimal> {
        self.value().map(|p| p * dec!(100))
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Probability::Defined(_))
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(pct) => write!(f, "{:.1}%", pct),
            None => write!(f, "n/a"),
        }
    }
}

/// Streak analysis errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Fewer than two closes, so not even one move exists
    #[error("Insufficient data: need at least 2 closes, got {got}")]
    InsufficientData { got: usize },
    /// No historical streak of this direction ever reached the length
    #[error("No {direction} streak history reaching length {length}")]
    NoHistory { direction: Direction, length: usize },
}
