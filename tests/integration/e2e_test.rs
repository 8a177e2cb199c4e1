//! End-to-end integration tests

use std::io::Write;
use streak_odds::config::Config;
use streak_odds::feed::Granularity;
use streak_odds::scanner::ScanMode;
use streak_odds::streak::HistoryPolicy;

#[test]
fn test_config_example_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example");
    let config = Config::load(path).unwrap();

    assert_eq!(config.feed.interval, Granularity::OneDay);
    assert_eq!(config.analysis.history_policy, HistoryPolicy::ExcludeCurrent);
    assert_eq!(config.scan.mode, ScanMode::Both);
    assert!(!config.universe.symbols.is_empty());
    assert!(config.scan_config().unwrap().validate().is_ok());
}

#[test]
fn test_config_file_with_universe_file() {
    let dir = tempfile::tempdir().unwrap();
    let universe = dir.path().join("universe.txt");
    std::fs::write(&universe, "AAPL\nMSFT\n").unwrap();

    let config_path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    writeln!(
        file,
        "[universe]\nfile = \"{}\"\n\n[scan]\nmode = \"downside-only\"",
        universe.display()
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    assert_eq!(config.universe.file.as_deref(), Some(universe.as_path()));
    assert_eq!(config.scan.mode, ScanMode::DownsideOnly);
}

#[test]
fn test_config_rejects_unknown_mode() {
    let result = toml::from_str::<Config>("[scan]\nmode = \"sideways\"");
    assert!(result.is_err());
}
