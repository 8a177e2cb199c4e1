//! Analyze command implementation

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use super::{render, resolve_request, OutputFormat};
use crate::config::Config;
use crate::feed::{Granularity, PriceHistoryProvider, YahooClient};
use crate::streak::{Analysis, HistoryPolicy, LengthBucket, StreakAnalyzer};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Ticker symbol, e.g. AAPL or BTC-USD
    pub symbol: String,

    /// Bar interval (1m, 5m, 1h, 1d, 1wk, 1mo, ...)
    #[arg(short, long)]
    pub interval: Option<Granularity>,

    /// Days of history to request
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Count the open streak in its own history
    #[arg(long)]
    pub include_current: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// JSON view of one analysis
#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    symbol: &'a str,
    interval: Granularity,
    #[serde(flatten)]
    analysis: &'a Analysis,
    up_histogram: Vec<LengthBucket>,
    down_histogram: Vec<LengthBucket>,
}

impl AnalyzeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbol = self.symbol.trim().to_uppercase();
        let (granularity, lookback) = resolve_request(config, self.interval, self.days)?;
        let policy = if self.include_current {
            HistoryPolicy::IncludeCurrent
        } else {
            config.analysis.history_policy
        };

        tracing::info!(
            symbol = %symbol,
            interval = %granularity,
            days = lookback.as_days(),
            policy = ?policy,
            "Analyzing instrument"
        );

        let client = YahooClient::with_config(config.feed.yahoo_config())?;
        let prices = client
            .fetch_prices(&symbol, granularity, lookback)
            .await
            .with_context(|| format!("Failed to fetch prices for {}", symbol))?;

        let analysis = StreakAnalyzer::new(policy)
            .analyze(&prices)
            .with_context(|| format!("Cannot analyze {}", symbol))?;

        match self.format {
            OutputFormat::Table => {
                print!("{}", render::analysis_table(&symbol, granularity, &analysis))
            }
            OutputFormat::Json => {
                let output = AnalyzeOutput {
                    symbol: &symbol,
                    interval: granularity,
                    up_histogram: analysis.up.histogram(),
                    down_histogram: analysis.down.histogram(),
                    analysis: &analysis,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }

        Ok(())
    }
}
