use anyhow::Context;
use clap::Parser;
use streak_odds::cli::{Cli, Commands};
use streak_odds::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {:#}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))
                .context("Embedded default config is invalid")?
        }
    };

    // Initialize telemetry
    streak_odds::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Analyze(args) => {
            args.execute(&config).await?;
        }
        Commands::Scan(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            let universe = match &config.universe.file {
                Some(path) => format!("file {}", path.display()),
                None => format!("{} symbols", config.universe.symbols.len()),
            };
            println!("Current configuration:");
            println!(
                "  Feed: {} interval={} lookback={}d",
                config.feed.base_url, config.feed.interval, config.feed.lookback_days
            );
            println!(
                "  Analysis: history={:?} min_data_points={}",
                config.analysis.history_policy, config.analysis.min_data_points
            );
            println!(
                "  Scan: mode={} min_probability={}% concurrency={} timeout={}s top={}",
                config.scan.mode,
                config.scan.min_probability,
                config.scan.concurrency,
                config.scan.fetch_timeout_secs,
                config.scan.top
            );
            println!("  Universe: {}", universe);
            println!(
                "  Telemetry: level={} format={:?} metrics_port={}",
                config.telemetry.log_level,
                config.telemetry.log_format,
                config
                    .telemetry
                    .metrics_port
                    .map_or_else(|| "off".to_string(), |p| p.to_string())
            );
        }
    }

    Ok(())
}
