//! Streak analyzer
//!
//! Turns a close-price series into the current streak, per-direction
//! distributions and the next / period-after-next odds.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::distribution::{
    DirectionalOdds, ExtensionOdds, HistoryPolicy, Rarity, StreakDistribution, StreakSummary,
};
use super::segment::{classify_moves, segment};
use super::types::{AnalysisError, CurrentStreak, Direction, PricePoint, Probability, Streak};

/// Odds for the close after next, one branch per realized next direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AfterNext {
    /// Next close is higher
    pub if_next_up: DirectionalOdds,
    /// Next close is lower or equal
    pub if_next_down: DirectionalOdds,
}

impl AfterNext {
    pub fn given(&self, next: Direction) -> DirectionalOdds {
        match next {
            Direction::Up => self.if_next_up,
            Direction::Down => self.if_next_down,
        }
    }
}

/// Full result of analyzing one instrument's closes
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Policy the distributions were built with
    pub policy: HistoryPolicy,
    /// Every streak, chronological, current one last
    pub streaks: Vec<Streak>,
    pub current: CurrentStreak,
    /// Historical up streaks
    pub up: StreakDistribution,
    /// Historical down streaks
    pub down: StreakDistribution,
    /// Counts behind the current streak's extend/break probability
    pub extension: ExtensionOdds,
    pub next: DirectionalOdds,
    pub after_next: AfterNext,
    pub rarity: Rarity,
    pub last_close: Decimal,
    pub previous_close: Decimal,
    /// Last period change in percent, `None` if the previous close is zero
    pub last_change_pct: Option<Decimal>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub price_count: usize,
}

impl Analysis {
    /// Number of classified moves (`price_count - 1`)
    pub fn move_count(&self) -> usize {
        self.price_count - 1
    }

    pub fn distribution(&self, direction: Direction) -> &StreakDistribution {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    pub fn summary(&self, direction: Direction) -> StreakSummary {
        self.distribution(direction).summary()
    }

    /// Extension counts for an arbitrary direction and length against this history
    pub fn extension_odds(&self, direction: Direction, length: usize) -> ExtensionOdds {
        self.distribution(direction).extension_odds(length)
    }

    pub fn extend_probability(&self, direction: Direction, length: usize) -> Probability {
        self.extension_odds(direction, length).extend_probability()
    }

    pub fn break_probability(&self, direction: Direction, length: usize) -> Probability {
        self.extension_odds(direction, length).break_probability()
    }

    /// True when the current streak has no precedent of its direction and length
    pub fn lacks_history(&self) -> bool {
        !self.extension.extend_probability().is_defined()
    }
}

/// Streak analyzer
///
/// Stateless apart from its history policy, so one instance can serve any
/// number of instruments concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakAnalyzer {
    policy: HistoryPolicy,
}

impl StreakAnalyzer {
    pub fn new(policy: HistoryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> HistoryPolicy {
        self.policy
    }

    /// Analyze a chronologically ordered price series.
    ///
    /// Requires at least two prices.
    pub fn analyze(&self, prices: &[PricePoint]) -> Result<Analysis, AnalysisError> {
        let (first, previous, last) = match prices {
            [first, .., last] => (first, &prices[prices.len() - 2], last),
            _ => return Err(AnalysisError::InsufficientData { got: prices.len() }),
        };

        let closes: Vec<Decimal> = prices.iter().map(|p| p.close).collect();
        let moves = classify_moves(&closes);
        let streaks = segment(&moves);

        // at least one move, so at least one streak
        let current = match streaks.last() {
            Some(open) => CurrentStreak::from(open),
            None => return Err(AnalysisError::InsufficientData { got: prices.len() }),
        };

        let history = self.policy.history(&streaks);
        let up = StreakDistribution::from_streaks(Direction::Up, history);
        let down = StreakDistribution::from_streaks(Direction::Down, history);

        let own = match current.direction {
            Direction::Up => &up,
            Direction::Down => &down,
        };
        let extension = own.extension_odds(current.length);
        let rarity = own.rarity(current.length);
        let next = extension.directional();

        let scenario = |realized: Direction| {
            let length = if realized == current.direction {
                current.length + 1
            } else {
                1
            };
            let dist = match realized {
                Direction::Up => &up,
                Direction::Down => &down,
            };
            dist.extension_odds(length).directional()
        };
        let after_next = AfterNext {
            if_next_up: scenario(Direction::Up),
            if_next_down: scenario(Direction::Down),
        };

        let last_change_pct = if previous.close.is_zero() {
            None
        } else {
            Some((last.close - previous.close) / previous.close * dec!(100))
        };

        tracing::debug!(
            prices = prices.len(),
            streaks = streaks.len(),
            current_direction = %current.direction,
            current_length = current.length,
            next_up = %next.up,
            next_down = %next.down,
            "Streak analysis complete"
        );

        Ok(Analysis {
            policy: self.policy,
            current,
            up,
            down,
            extension,
            next,
            after_next,
            rarity,
            last_close: last.close,
            previous_close: previous.close,
            last_change_pct,
            window_start: first.timestamp,
            window_end: last.timestamp,
            price_count: prices.len(),
            streaks,
        })
    }
}
