//! Release asset sources.
//!
//! This module resolves a release asset URI to local bytes and hashes them:
//! - Direct HTTP downloads with bounded retry (`http`)
//! - Downloads through the GitHub release-asset API (`github`)
//! - SHA-256 over downloaded files (`checksum`)
//! - Per-call temp files (`file`)
//!
//! # Architecture
//!
//! ```text
//! Downloader (trait)
//!     ├── HttpDownloader    GET <uri>, up to N attempts
//!     └── GithubDownloader  tag -> release -> asset id -> bytes
//!             │
//!             ▼
//!     DownloadedFile (own temp dir, removed by the caller)
//!             │
//!             ▼
//!     calculate_file_checksum -> lowercase hex SHA-256
//! ```
//!
//! # Example
//!
//! ```ignore
//! use krew_release::source::{hash_from_reference, DownloadConfig, HttpDownloader};
//!
//! let downloader = HttpDownloader::new(DownloadConfig::default())?;
//! let sha256 = hash_from_reference(
//!     &downloader,
//!     "https://github.com/rajatjindal/kubectl-whoami/releases/download/v0.0.2/kubectl-whoami_v0.0.2_darwin_amd64.tar.gz",
//! )?;
//! ```

mod checksum;
mod config;
mod error;
mod file;
mod github;
mod http;

use std::fmt;
use std::str::FromStr;

pub use checksum::{calculate_file_checksum, hash_from_reference};
pub use config::{
    DownloadConfig, DEFAULT_API_BASE_URL, DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
pub use error::{DownloadFailure, SourceError, SourceResult};
pub use file::DownloadedFile;
#[cfg(test)]
pub(crate) use file::write_temp_file;
pub use github::{AssetReference, GithubDownloader, Release, ReleaseAsset};
pub use http::HttpDownloader;

/// Fetches the bytes behind an asset URI into a fresh local file.
pub trait Downloader {
    /// Download `uri` into a new temp directory as a file called `name`.
    ///
    /// The returned file belongs to the caller, who must remove it.
    fn fetch(&self, uri: &str, name: &str) -> SourceResult<DownloadedFile>;
}

impl<D: Downloader + ?Sized> Downloader for &D {
    fn fetch(&self, uri: &str, name: &str) -> SourceResult<DownloadedFile> {
        (**self).fetch(uri, name)
    }
}

impl<D: Downloader + ?Sized> Downloader for Box<D> {
    fn fetch(&self, uri: &str, name: &str) -> SourceResult<DownloadedFile> {
        (**self).fetch(uri, name)
    }
}

/// Which download strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadStrategy {
    /// Plain GET on the asset URI.
    #[default]
    Direct,
    /// Resolve the asset through the GitHub release API.
    Github,
}

impl DownloadStrategy {
    /// Build the downloader for this strategy.
    pub fn build(self, config: DownloadConfig) -> SourceResult<Box<dyn Downloader>> {
        let downloader: Box<dyn Downloader> = match self {
            DownloadStrategy::Direct => Box::new(HttpDownloader::new(config)?),
            DownloadStrategy::Github => Box::new(GithubDownloader::new(config)?),
        };
        Ok(downloader)
    }

    /// Name used on the command line and in logs.
    pub fn name(self) -> &'static str {
        match self {
            DownloadStrategy::Direct => "direct",
            DownloadStrategy::Github => "github",
        }
    }
}

impl fmt::Display for DownloadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DownloadStrategy {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" | "http" => Ok(DownloadStrategy::Direct),
            "github" | "api" => Ok(DownloadStrategy::Github),
            other => Err(SourceError::InvalidConfig(format!(
                "unknown download strategy '{}'",
                other
            ))),
        }
    }
}
