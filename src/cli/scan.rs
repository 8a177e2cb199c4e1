//! Scan command implementation

use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{render, resolve_request, OutputFormat};
use crate::config::Config;
use crate::feed::{Granularity, YahooClient};
use crate::scanner::{MarketScanner, ScanConfig, ScanMode};
use crate::streak::HistoryPolicy;
use crate::universe::{FileUniverse, StaticUniverse, UniverseProvider};

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Which next-period side to filter on
    #[arg(short, long, value_enum)]
    pub mode: Option<ScanMode>,

    /// Minimum probability in percent (0-100)
    #[arg(short = 'p', long)]
    pub min_probability: Option<Decimal>,

    /// Rows in the ranked-by-probability view
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Comma separated symbols, overrides the configured universe
    #[arg(short, long)]
    pub symbols: Option<String>,

    /// File with symbols to scan
    #[arg(long)]
    pub universe_file: Option<PathBuf>,

    /// Bar interval (1m, 5m, 1h, 1d, 1wk, 1mo, ...)
    #[arg(short, long)]
    pub interval: Option<Granularity>,

    /// Days of history to request
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Instruments fetched concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-instrument fetch timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Count the open streak in its own history
    #[arg(long)]
    pub include_current: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl ScanArgs {
    /// Config values with command line overrides applied
    fn scan_config(&self, config: &Config) -> anyhow::Result<ScanConfig> {
        let (granularity, lookback) = resolve_request(config, self.interval, self.days)?;
        let mut scan = config.scan_config()?;
        scan.granularity = granularity;
        scan.lookback = lookback;
        if let Some(mode) = self.mode {
            scan.mode = mode;
        }
        if let Some(min_probability) = self.min_probability {
            scan.min_probability_pct = min_probability;
        }
        if let Some(concurrency) = self.concurrency {
            scan.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            scan.fetch_timeout = Duration::from_secs(timeout);
        }
        if self.include_current {
            scan.history_policy = HistoryPolicy::IncludeCurrent;
        }
        Ok(scan)
    }

    fn universe(&self, config: &Config) -> Box<dyn UniverseProvider> {
        if let Some(list) = &self.symbols {
            return Box::new(StaticUniverse::parse(list));
        }
        match self.universe_file.as_ref().or(config.universe.file.as_ref()) {
            Some(path) => Box::new(FileUniverse::new(path)),
            None => Box::new(StaticUniverse::new(&config.universe.symbols)),
        }
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let scan_config = self.scan_config(config)?;
        let symbols = self.universe(config).symbols().await?;

        let client = Arc::new(YahooClient::with_config(config.feed.yahoo_config())?);
        let scanner = MarketScanner::new(client.clone(), client);

        let stop = scanner.stop_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Stop requested, finishing in-flight instruments");
                stop.stop();
            }
        });

        let report = scanner.scan(&symbols, &scan_config).await?;

        match self.format {
            OutputFormat::Table => {
                let top = self.top.unwrap_or(config.scan.top);
                print!("{}", render::scan_table(&report, top));
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }

        Ok(())
    }
}
