//! Instrument universe
//!
//! Where the scanner gets its symbol list from: a fixed list (config or CLI)
//! or a plain text file with one or more symbols per line.

use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;

/// Source of instrument identifiers to scan
#[async_trait]
pub trait UniverseProvider: Send + Sync {
    /// Symbols in scan order, normalized and deduplicated
    async fn symbols(&self) -> anyhow::Result<Vec<String>>;
}

/// Fixed symbol list
#[derive(Debug, Clone, Default)]
pub struct StaticUniverse {
    symbols: Vec<String>,
}

impl StaticUniverse {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            symbols: normalize_symbols(symbols),
        }
    }

    /// Parse a comma or whitespace separated list, e.g. `"AAPL, msft NVDA"`
    pub fn parse(list: &str) -> Self {
        Self::new(split_symbols(list))
    }
}

#[async_trait]
impl UniverseProvider for StaticUniverse {
    async fn symbols(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.symbols.clone())
    }
}

/// Symbol list read from a text file
///
/// Blank lines and anything after `#` are ignored. A line may hold several
/// symbols separated by commas or whitespace.
#[derive(Debug, Clone)]
pub struct FileUniverse {
    path: PathBuf,
}

impl FileUniverse {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl UniverseProvider for FileUniverse {
    async fn symbols(&self) -> anyhow::Result<Vec<String>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read universe file {}", self.path.display()))?;

        let symbols = normalize_symbols(
            content
                .lines()
                .map(|line| line.split('#').next().unwrap_or_default())
                .flat_map(split_symbols),
        );

        tracing::debug!(
            path = %self.path.display(),
            count = symbols.len(),
            "Loaded universe file"
        );

        Ok(symbols)
    }
}

fn split_symbols(list: &str) -> impl Iterator<Item = &str> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

/// Trim, uppercase and drop duplicates, keeping first occurrence order
pub fn normalize_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
