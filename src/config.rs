//! Configuration types for streak-odds

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::feed::{Granularity, Lookback, YahooConfig, YAHOO_API_URL};
use crate::scanner::{ScanConfig, ScanMode};
use crate::streak::HistoryPolicy;
use crate::telemetry::LogFormat;

/// Root configuration structure
///
/// Every section and field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub universe: UniverseConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Price data source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Chart and quote API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bar interval, e.g. "1d", "1h", "1wk"
    #[serde(default = "default_interval")]
    pub interval: Granularity,

    /// Calendar days of history to request
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    YAHOO_API_URL.to_string()
}
fn default_interval() -> Granularity {
    Granularity::OneDay
}
fn default_lookback_days() -> u32 {
    1000
}
fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            interval: default_interval(),
            lookback_days: default_lookback_days(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: None,
        }
    }
}

impl FeedConfig {
    pub fn lookback(&self) -> anyhow::Result<Lookback> {
        Lookback::days(self.lookback_days).context("Invalid feed.lookback_days")
    }

    pub fn yahoo_config(&self) -> YahooConfig {
        let defaults = YahooConfig::default();
        YahooConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

/// Streak analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Whether the open streak counts towards its own history
    #[serde(default)]
    pub history_policy: HistoryPolicy,

    /// Minimum closes for an instrument to be analyzed in a scan
    #[serde(default = "default_min_data_points")]
    pub min_data_points: usize,
}

fn default_min_data_points() -> usize {
    10
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_policy: HistoryPolicy::default(),
            min_data_points: default_min_data_points(),
        }
    }
}

/// Scan configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScanSettings {
    /// Which side to filter on
    #[serde(default)]
    pub mode: ScanMode,

    /// Minimum probability in percent, 0 keeps every analyzed instrument
    #[serde(default = "default_min_probability")]
    pub min_probability: Decimal,

    /// Instruments fetched concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-instrument fetch budget (seconds)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Rows shown in the ranked view
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_min_probability() -> Decimal {
    Decimal::new(60, 0) // 60%
}
fn default_concurrency() -> usize {
    4
}
fn default_fetch_timeout_secs() -> u64 {
    30
}
fn default_top() -> usize {
    10
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            mode: ScanMode::default(),
            min_probability: default_min_probability(),
            concurrency: default_concurrency(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            top: default_top(),
        }
    }
}

/// Instruments to scan when none are given on the command line
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniverseConfig {
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Text file with one or more symbols per line; used instead of `symbols` when set
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Prometheus exporter port, disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: None,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Scan parameters from the `[feed]`, `[analysis]` and `[scan]` sections
    pub fn scan_config(&self) -> anyhow::Result<ScanConfig> {
        Ok(ScanConfig {
            granularity: self.feed.interval,
            lookback: self.feed.lookback()?,
            mode: self.scan.mode,
            min_probability_pct: self.scan.min_probability,
            concurrency: self.scan.concurrency,
            fetch_timeout: Duration::from_secs(self.scan.fetch_timeout_secs),
            min_data_points: self.analysis.min_data_points,
            history_policy: self.analysis.history_policy,
        })
    }
}
