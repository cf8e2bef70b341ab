//! Downloads through the GitHub release-asset API.
//!
//! A `releases/download` URL is split into owner, repo, tag and asset name.
//! The release is looked up by tag, the asset is found by exact name in the
//! release's asset list, and its bytes are streamed from the asset endpoint.
//! This works for private repositories where the public download URL would
//! need a browser session.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use super::config::DownloadConfig;
use super::error::{SourceError, SourceResult};
use super::file::{write_temp_file, DownloadedFile};
use super::http::build_client;
use super::Downloader;

/// Media type for JSON API responses.
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Media type that makes the asset endpoint return the binary itself.
const ACCEPT_BINARY: &str = "application/octet-stream";

/// Pinned REST API version.
const API_VERSION: &str = "2022-11-28";

/// Host of public release download links.
const PUBLIC_HOST: &str = "github.com";

/// Host of the public REST API.
const PUBLIC_API_HOST: &str = "api.github.com";

/// Pattern for `https://<host>/<owner>/<repo>/releases/download/<tag>/<asset>`.
///
/// - Group 1: owner
/// - Group 2: repository
/// - Group 3: tag
/// - Group 4: asset filename
fn pattern_for(host: &str) -> String {
    format!(
        r"^https://{}/([^:/\s]+)/([^:/\s]+)/releases/download/([^:/\s]+)/([^:/\s?#]+)$",
        regex::escape(host)
    )
}

fn asset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(&pattern_for(PUBLIC_HOST)).unwrap())
}

/// A release asset URL split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Release tag.
    pub tag: String,
    /// Asset filename.
    pub asset: String,
}

impl AssetReference {
    /// Parse a `releases/download` URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use krew_release::source::AssetReference;
    ///
    /// let r = AssetReference::parse(
    ///     "https://github.com/rajatjindal/kubectl-whoami/releases/download/v0.0.2/kubectl-whoami_v0.0.2_darwin_amd64.tar.gz",
    /// )
    /// .unwrap();
    /// assert_eq!(r.owner, "rajatjindal");
    /// assert_eq!(r.repo, "kubectl-whoami");
    /// assert_eq!(r.tag, "v0.0.2");
    /// assert_eq!(r.asset, "kubectl-whoami_v0.0.2_darwin_amd64.tar.gz");
    /// ```
    pub fn parse(uri: &str) -> SourceResult<Self> {
        Self::from_pattern(asset_pattern(), uri)
    }

    /// Parse a `releases/download` URL served from `host` (GitHub Enterprise).
    pub fn parse_for_host(uri: &str, host: &str) -> SourceResult<Self> {
        let pattern = Regex::new(&pattern_for(host))
            .map_err(|e| SourceError::InvalidConfig(format!("bad host {}: {}", host, e)))?;
        Self::from_pattern(&pattern, uri)
    }

    fn from_pattern(pattern: &Regex, uri: &str) -> SourceResult<Self> {
        let captures =
            pattern
                .captures(uri.trim())
                .ok_or_else(|| SourceError::InvalidAssetReference {
                    uri: uri.to_string(),
                })?;

        Ok(Self {
            owner: captures[1].to_string(),
            repo: captures[2].to_string(),
            tag: captures[3].to_string(),
            asset: captures[4].to_string(),
        })
    }

    /// The public download URL this reference was parsed from.
    pub fn download_url(&self) -> String {
        format!(
            "https://github.com/{}/{}/releases/download/{}/{}",
            self.owner, self.repo, self.tag, self.asset
        )
    }
}

impl FromStr for AssetReference {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}:{}",
            self.owner, self.repo, self.tag, self.asset
        )
    }
}

/// A release's asset. Does not contain all fields.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// A GitHub release. Does not contain all fields.
///
/// See the GitHub [docs](https://docs.github.com/en/rest/releases/releases#get-a-release-by-tag-name)
/// for the full payload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// First asset whose name matches exactly.
    pub fn find_asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// Downloads assets through the release API.
#[derive(Debug, Clone)]
pub struct GithubDownloader {
    client: Client,
    config: DownloadConfig,
}

impl GithubDownloader {
    /// Create a downloader from configuration.
    pub fn new(config: DownloadConfig) -> SourceResult<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Use an already configured client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Split an asset URL into its parts.
    ///
    /// `github.com` links are always accepted. With an API base on another
    /// host (GitHub Enterprise), links on that host are accepted too.
    pub fn reference(&self, uri: &str) -> SourceResult<AssetReference> {
        match (AssetReference::parse(uri), self.enterprise_host()) {
            (Err(_), Some(host)) => AssetReference::parse_for_host(uri, &host),
            (result, _) => result,
        }
    }

    fn enterprise_host(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.config.api_base_url).ok()?;
        let host = url.host_str()?;
        (host != PUBLIC_API_HOST).then(|| host.to_string())
    }

    /// Look up a release by its tag.
    pub fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> SourceResult<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.config.api_base_url, owner, repo, tag
        );

        let response = self.send(&url, ACCEPT_JSON)?;
        let release: Release = response
            .json()
            .map_err(|e| SourceError::transport(&url, format!("failed to parse release: {}", e)))?;

        debug!(
            "release {} of {}/{} has {} assets",
            tag,
            owner,
            repo,
            release.assets.len()
        );
        Ok(release)
    }

    /// Open the binary stream of one asset.
    pub fn download_asset(&self, owner: &str, repo: &str, id: u64) -> SourceResult<Response> {
        let url = format!(
            "{}/repos/{}/{}/releases/assets/{}",
            self.config.api_base_url, owner, repo, id
        );
        self.send(&url, ACCEPT_BINARY)
    }

    fn request(&self, url: &str, accept: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("Accept", accept)
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, url: &str, accept: &str) -> SourceResult<Response> {
        debug!("GET {} (accept {})", url, accept);
        let response = self
            .request(url, accept)
            .send()
            .map_err(|e| SourceError::transport(url, e))?;

        match response.status() {
            StatusCode::OK => Ok(response),
            status => Err(SourceError::status(url, status.as_u16())),
        }
    }
}

impl Downloader for GithubDownloader {
    fn fetch(&self, uri: &str, name: &str) -> SourceResult<DownloadedFile> {
        let reference = self.reference(uri)?;
        let release = self.release_by_tag(&reference.owner, &reference.repo, &reference.tag)?;

        let asset = release
            .find_asset(&reference.asset)
            .ok_or_else(|| SourceError::AssetNotFound {
                asset: reference.asset.clone(),
                tag: reference.tag.clone(),
            })?;

        info!("downloading asset {} (id {})", reference, asset.id);
        let response = self.download_asset(&reference.owner, &reference.repo, asset.id)?;
        write_temp_file(response, name, uri)
    }
}
