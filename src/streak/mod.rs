//! Streak analysis module
//!
//! Classifies close-to-close moves, segments them into maximal up/down streaks
//! and derives how often streaks like the current one were extended or broken.
//! Everything here is synchronous and allocation-light so the scanner can run
//! it once per instrument without coordination.

mod analyzer;
mod distribution;
mod segment;
mod types;

pub use analyzer::{AfterNext, Analysis, StreakAnalyzer};
pub use distribution::{
    DirectionalOdds, ExtensionOdds, HistoryPolicy, LengthBucket, Rarity, StreakDistribution,
    StreakSummary,
};
pub use segment::{classify_moves, segment};
pub use types::{AnalysisError, CurrentStreak, Direction, PricePoint, Probability, Streak};
