//! Historical streak distributions and the odds derived from them

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{AnalysisError, Direction, Probability, Streak};

/// Which streaks form the comparison history for the trailing streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryPolicy {
    /// Only streaks completed strictly before the current one
    #[default]
    ExcludeCurrent,
    /// Every streak, the still-open current one included
    IncludeCurrent,
}

impl HistoryPolicy {
    /// Select the historical streaks from a full segmentation.
    ///
    /// `streaks` must be in chronological order with the open streak last.
    /// Every probability and summary statistic is computed over this slice, so
    /// the current streak is never conditioned on itself unless
    /// `IncludeCurrent` is asked for.
    pub fn history<'a>(&self, streaks: &'a [Streak]) -> &'a [Streak] {
        match self {
            HistoryPolicy::ExcludeCurrent => match streaks.split_last() {
                Some((_, completed)) => completed,
                None => streaks,
            },
            HistoryPolicy::IncludeCurrent => streaks,
        }
    }
}

/// All observed streak lengths for one direction, one entry per streak
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakDistribution {
    direction: Direction,
    lengths: Vec<usize>,
}

impl StreakDistribution {
    /// Collect the lengths of `direction` streaks, in order of occurrence
    pub fn from_streaks(direction: Direction, streaks: &[Streak]) -> Self {
        let lengths = streaks
            .iter()
            .filter(|s| s.direction == direction)
            .map(|s| s.length)
            .collect();
        Self { direction, lengths }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn count(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn longest(&self) -> Option<usize> {
        self.lengths.iter().copied().max()
    }

    /// Arithmetic mean length, `None` without observations
    pub fn mean(&self) -> Option<Decimal> {
        if self.lengths.is_empty() {
            return None;
        }
        let total: usize = self.lengths.iter().sum();
        Some(Decimal::from(total) / Decimal::from(self.lengths.len()))
    }

    /// Number of streaks that reached at least `length`
    pub fn count_at_least(&self, length: usize) -> usize {
        self.lengths.iter().filter(|&&l| l >= length).count()
    }

    /// How often a streak of this direction that reached `length` went on to `length + 1`
    pub fn extension_odds(&self, length: usize) -> ExtensionOdds {
        ExtensionOdds {
            direction: self.direction,
            length,
            extended: self.count_at_least(length + 1),
            opportunities: self.count_at_least(length),
        }
    }

    /// Position of `length` within this distribution
    pub fn rarity(&self, length: usize) -> Rarity {
        let shorter = self.lengths.iter().filter(|&&l| l < length).count();
        let longer = self.lengths.iter().filter(|&&l| l > length).count();
        Rarity {
            length,
            shorter: Probability::ratio(shorter, self.count()),
            longer: Probability::ratio(longer, self.count()),
        }
    }

    /// Occurrences per length, shortest first
    pub fn histogram(&self) -> Vec<LengthBucket> {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &length in &self.lengths {
            *counts.entry(length).or_default() += 1;
        }

        let total = self.count();
        counts
            .into_iter()
            .map(|(length, count)| LengthBucket {
                length,
                count,
                share: Probability::ratio(count, total),
            })
            .collect()
    }

    pub fn summary(&self) -> StreakSummary {
        StreakSummary {
            direction: self.direction,
            count: self.count(),
            longest: self.longest(),
            mean_length: self.mean(),
        }
    }
}

/// Raw counts behind an extend/break probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtensionOdds {
    pub direction: Direction,
    /// Length already reached
    pub length: usize,
    /// Historical streaks that reached `length + 1`
    pub extended: usize,
    /// Historical streaks that reached `length`
    pub opportunities: usize,
}

impl ExtensionOdds {
    /// Probability the streak reaches `length + 1`
    pub fn extend_probability(&self) -> Probability {
        Probability::ratio(self.extended, self.opportunities)
    }

    /// Probability the streak ends at `length`
    pub fn break_probability(&self) -> Probability {
        self.extend_probability().complement()
    }

    /// Extend probability, failing when there is no precedent
    pub fn require_extend_probability(&self) -> Result<Decimal, AnalysisError> {
        self.extend_probability()
            .value()
            .ok_or(AnalysisError::NoHistory {
                direction: self.direction,
                length: self.length,
            })
    }

    /// Translate streak mechanics into next-close direction.
    ///
    /// Extending an up streak means a higher close; extending a down streak
    /// means a lower-or-equal close.
    pub fn directional(&self) -> DirectionalOdds {
        let extend = self.extend_probability();
        let reverse = self.break_probability();
        match self.direction {
            Direction::Up => DirectionalOdds {
                up: extend,
                down: reverse,
            },
            Direction::Down => DirectionalOdds {
                up: reverse,
                down: extend,
            },
        }
    }
}

/// Probability that the next close is up or down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectionalOdds {
    pub up: Probability,
    pub down: Probability,
}

impl DirectionalOdds {
    pub fn toward(&self, direction: Direction) -> Probability {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }
}

/// How unusual a streak length is within its direction's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rarity {
    pub length: usize,
    /// Share of historical streaks strictly shorter
    pub shorter: Probability,
    /// Share of historical streaks strictly longer
    pub longer: Probability,
}

/// One histogram bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthBucket {
    pub length: usize,
    pub count: usize,
    /// Share of all streaks in the direction
    pub share: Probability,
}

/// Count, longest and mean length for one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub direction: Direction,
    pub count: usize,
    pub longest: Option<usize>,
    pub mean_length: Option<Decimal>,
}
