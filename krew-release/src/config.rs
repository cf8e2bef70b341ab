//! Configuration file handling.
//!
//! Settings live in an INI file, by default
//! `<config dir>/krew-release/config.ini`:
//!
//! ```ini
//! [download]
//! strategy = direct
//! retries = 4
//! timeout_secs = 60
//! user_agent = krew-release
//!
//! [github]
//! api_url = https://api.github.com
//! token = ghp_example
//!
//! [index]
//! owner = artificialinc
//! repo = artificial-krew-repository
//! ```
//!
//! Every key is optional. A missing file gives the defaults.

use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use crate::krew::IndexRepository;
use crate::source::{DownloadConfig, DownloadStrategy, SourceError, SourceResult};

/// Directory under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "krew-release";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default configuration file location, if the platform has a config dir.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Settings read from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub download: DownloadConfig,
    /// How release assets are downloaded unless the command line says otherwise.
    pub strategy: DownloadStrategy,
    pub index: IndexRepository,
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> SourceResult<Self> {
        match config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; a missing file gives the defaults.
    pub fn load_from(path: &Path) -> SourceResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(SourceError::io(path, e)),
        };

        let ini = Ini::load_from_str(&text).map_err(|e| {
            SourceError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        debug!("loaded config from {}", path.display());
        Self::from_ini(&ini)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> SourceResult<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| SourceError::InvalidConfig(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> SourceResult<Self> {
        let mut download = DownloadConfig::default();

        let strategy = match ini.get_from(Some("download"), "strategy") {
            Some(value) => value.trim().parse::<DownloadStrategy>()?,
            None => DownloadStrategy::default(),
        };

        if let Some(value) = ini.get_from(Some("download"), "retries") {
            download = download.with_retries(parse_value("download", "retries", value)?);
        }
        if let Some(value) = ini.get_from(Some("download"), "timeout_secs") {
            let secs: u64 = parse_value("download", "timeout_secs", value)?;
            download = download.with_timeout(Duration::from_secs(secs));
        }
        if let Some(value) = ini.get_from(Some("download"), "user_agent") {
            download = download.with_user_agent(value.trim());
        }
        if let Some(value) = ini.get_from(Some("github"), "api_url") {
            download = download.with_api_base_url(value.trim());
        }
        if let Some(value) = ini.get_from(Some("github"), "token") {
            download = download.with_token(Some(value.trim().to_string()));
        }

        let mut index = IndexRepository::default();
        if let Some(value) = ini.get_from(Some("index"), "owner") {
            index.owner = value.trim().to_string();
        }
        if let Some(value) = ini.get_from(Some("index"), "repo") {
            index.name = value.trim().to_string();
        }

        Ok(Self {
            download,
            strategy,
            index,
        })
    }
}

fn parse_value<T>(section: &str, key: &str, value: &str) -> SourceResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e| {
        SourceError::InvalidConfig(format!("[{}] {} = '{}': {}", section, key, value, e))
    })
}
