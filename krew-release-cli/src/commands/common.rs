//! Common types and utilities shared across CLI commands.

use std::path::Path;

use clap::ValueEnum;
use krew_release::config::ConfigFile;
use krew_release::source::{DownloadStrategy, Downloader};

use crate::error::CliError;

/// Download strategy selection for CLI arguments.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum Strategy {
    /// Plain GET on the asset URL
    #[default]
    Direct,
    /// Look the asset up through the GitHub release API (works for private repos)
    Github,
}

impl From<Strategy> for DownloadStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Direct => DownloadStrategy::Direct,
            Strategy::Github => DownloadStrategy::Github,
        }
    }
}

/// The strategy from the command line, else the one in the config file.
pub fn resolve_strategy(strategy: Option<Strategy>, config: &ConfigFile) -> DownloadStrategy {
    strategy.map(DownloadStrategy::from).unwrap_or(config.strategy)
}

/// Build the downloader for `strategy` from configuration.
pub fn downloader(
    strategy: DownloadStrategy,
    config: &ConfigFile,
) -> Result<Box<dyn Downloader>, CliError> {
    Ok(strategy.build(config.download.clone())?)
}

/// Load configuration and apply command-line and environment overrides.
///
/// An explicit `--config` file must load; the default location may be absent.
/// A token from the command line or `GITHUB_TOKEN` wins over the file.
pub fn resolve_config(path: Option<&Path>, token: Option<String>) -> Result<ConfigFile, CliError> {
    let mut config = match path {
        Some(path) if !path.exists() => {
            return Err(CliError::Config(format!(
                "config file {} does not exist",
                path.display()
            )))
        }
        Some(path) => ConfigFile::load_from(path),
        None => ConfigFile::load(),
    }
    .map_err(|e| CliError::Config(e.to_string()))?;

    if token.as_deref().is_some_and(|t| !t.is_empty()) {
        config.download = config.download.with_token(token);
    }
    config.index = config.index.with_env_overrides();

    Ok(config)
}

/// Parse a `KEY=VALUE` argument.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
