//! Configuration for asset downloaders.

use std::time::Duration;

/// Number of attempts the direct downloader makes before giving up.
pub const DEFAULT_RETRIES: u32 = 4;

/// Default timeout for a single HTTP request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// User agent sent with every request; GitHub rejects API calls without one.
pub const DEFAULT_USER_AGENT: &str = concat!("krew-release/", env!("CARGO_PKG_VERSION"));

/// Configuration shared by both download strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Total attempts for a direct download (minimum 1).
    pub retries: u32,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Value of the `User-Agent` header.
    pub user_agent: String,

    /// Base URL of the release API, without trailing slash.
    pub api_base_url: String,

    /// Optional bearer token for API requests.
    pub token: Option<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token: None,
        }
    }
}

impl DownloadConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of attempts for direct downloads.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the release API base URL (GitHub Enterprise, local test servers).
    ///
    /// Release links on a non-public API host are accepted alongside `github.com` ones.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }
}
