//! CLI interface for streak-odds
//!
//! Provides subcommands for:
//! - `analyze`: Streak odds for one instrument
//! - `scan`: Threshold scan across a universe, ranked by market cap
//! - `config`: Show the effective configuration

mod analyze;
mod render;
mod scan;

pub use analyze::AnalyzeArgs;
pub use render::{analysis_table, market_cap, scan_table};
pub use scan::ScanArgs;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::feed::{Granularity, Lookback};

#[derive(Parser, Debug)]
#[command(name = "streak-odds")]
#[command(about = "Streak continuation and reversal odds from historical closes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the current streak of one instrument
    Analyze(AnalyzeArgs),
    /// Scan many instruments and rank the ones clearing a probability threshold
    Scan(ScanArgs),
    /// Show the effective configuration
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Resolve interval and look-back from flags, falling back to `[feed]`,
/// and log any provider caveats for the combination
fn resolve_request(
    config: &Config,
    interval: Option<Granularity>,
    days: Option<u32>,
) -> anyhow::Result<(Granularity, Lookback)> {
    let granularity = interval.unwrap_or(config.feed.interval);
    let lookback = match days {
        Some(days) => Lookback::days(days)?,
        None => config.feed.lookback()?,
    };

    for note in lookback.notes(granularity) {
        tracing::warn!(
            interval = %granularity,
            days = lookback.as_days(),
            "{}",
            note
        );
    }

    Ok((granularity, lookback))
}
