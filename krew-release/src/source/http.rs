//! Direct HTTP downloader with bounded retry.
//!
//! The asset URI is requested verbatim. Any transport error or non-2xx
//! response is retried immediately until the configured number of attempts is
//! used up; the last attempt decides the outcome.

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::config::DownloadConfig;
use super::error::{SourceError, SourceResult};
use super::file::{write_temp_file, DownloadedFile};
use super::Downloader;

/// Downloads assets with plain GET requests.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    config: DownloadConfig,
}

impl HttpDownloader {
    /// Create a downloader from configuration.
    ///
    /// Fails with [`SourceError::InvalidConfig`] when the HTTP client cannot
    /// be built, e.g. for a user agent that is not a valid header value.
    pub fn new(config: DownloadConfig) -> SourceResult<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Use an already configured client (shared connection pool, custom TLS).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// GET `uri`, retrying on transport errors and non-2xx responses.
    ///
    /// Succeeds only when the final response is 200 OK.
    pub fn get_with_retry(&self, uri: &str) -> SourceResult<Response> {
        let attempts = self.config.retries.max(1);
        let mut attempt = 1;

        loop {
            debug!("GET {} (attempt {}/{})", uri, attempt, attempts);
            let result = self.client.get(uri).send();

            let retry = match &result {
                Ok(response) => !response.status().is_success(),
                Err(_) => true,
            };

            if !retry || attempt >= attempts {
                return self.finish(uri, result);
            }

            match &result {
                Ok(response) => warn!(
                    "GET {} returned {} (attempt {}/{}), retrying",
                    uri,
                    response.status(),
                    attempt,
                    attempts
                ),
                Err(e) => warn!(
                    "GET {} failed: {} (attempt {}/{}), retrying",
                    uri, e, attempt, attempts
                ),
            }

            attempt += 1;
        }
    }

    fn finish(&self, uri: &str, result: reqwest::Result<Response>) -> SourceResult<Response> {
        match result {
            Ok(response) if response.status() == StatusCode::OK => Ok(response),
            Ok(response) => Err(SourceError::status(uri, response.status().as_u16())),
            Err(e) if e.is_timeout() => Err(SourceError::transport(
                uri,
                format!(
                    "request timed out after {}s",
                    self.config.timeout.as_secs()
                ),
            )),
            Err(e) => Err(SourceError::transport(uri, e)),
        }
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, uri: &str, name: &str) -> SourceResult<DownloadedFile> {
        let response = self.get_with_retry(uri)?;
        write_temp_file(response, name, uri)
    }
}

/// Build the blocking client shared by both strategies.
pub(crate) fn build_client(config: &DownloadConfig) -> SourceResult<Client> {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| SourceError::InvalidConfig(format!("failed to create HTTP client: {}", e)))
}
