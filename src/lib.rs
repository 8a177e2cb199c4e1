//! streak-odds: empirical odds that a run of up or down closes continues
//!
//! This library provides the core components for:
//! - Segmenting close prices into maximal up/down streaks
//! - Extension, reversal and period-after-next probabilities for the current streak
//! - Scanning a universe of instruments with a probability threshold
//! - Ranking retained instruments by market capitalization
//! - Price history and market cap retrieval over HTTP
//! - Logging and metrics

pub mod cli;
pub mod config;
pub mod feed;
pub mod scanner;
pub mod streak;
pub mod telemetry;
pub mod universe;
