//! Error types for asset sources and manifest rendering.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Why a download attempt ended without usable bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadFailure {
    /// The server answered, but not with 200 OK.
    Status(u16),

    /// The request never produced a response, or the body broke mid-stream.
    Transport(String),
}

impl fmt::Display for DownloadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadFailure::Status(code) => {
                write!(f, "status code: {}, expected: 200", code)
            }
            DownloadFailure::Transport(reason) => write!(f, "{}", reason),
        }
    }
}

/// Errors that can occur while fetching assets or rendering a manifest.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The asset URI does not have the `releases/download` shape.
    #[error("failed to parse github uri {uri}")]
    InvalidAssetReference { uri: String },

    /// Download (or platform API request) did not succeed.
    #[error("downloading file {uri} failed. {failure}")]
    DownloadFailed {
        uri: String,
        failure: DownloadFailure,
    },

    /// The release exists but has no asset with the requested name.
    #[error("failed to find asset {asset} in release {tag}")]
    AssetNotFound { asset: String, tag: String },

    /// Local file creation, read or write failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    /// The manifest template could not be evaluated.
    #[error("failed to render template {template}: {reason}")]
    Template { template: String, reason: String },

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SourceError {
    /// Shorthand for an I/O failure on `path`.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for a non-200 response.
    pub(crate) fn status(uri: impl Into<String>, code: u16) -> Self {
        SourceError::DownloadFailed {
            uri: uri.into(),
            failure: DownloadFailure::Status(code),
        }
    }

    /// Shorthand for a transport-level failure.
    pub(crate) fn transport(uri: impl Into<String>, reason: impl ToString) -> Self {
        SourceError::DownloadFailed {
            uri: uri.into(),
            failure: DownloadFailure::Transport(reason.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_download_failed_status_display() {
        let err = SourceError::status("https://example.com/a.tar.gz", 404);
        assert_eq!(
            err.to_string(),
            "downloading file https://example.com/a.tar.gz failed. status code: 404, expected: 200"
        );
    }

    #[test]
    fn test_asset_not_found_display() {
        let err = SourceError::AssetNotFound {
            asset: "kubectl-whoami.tar.gz".to_string(),
            tag: "v0.0.2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to find asset kubectl-whoami.tar.gz in release v0.0.2"
        );
    }

    #[test]
    fn test_invalid_asset_reference_display() {
        let err = SourceError::InvalidAssetReference {
            uri: "https://example.com/file".to_string(),
        };
        assert!(err.to_string().contains("https://example.com/file"));
    }

    #[test]
    fn test_io_error_source() {
        let err = SourceError::io(
            "/tmp/missing",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/missing"));
    }

    #[test]
    fn test_template_error_source_none() {
        let err = SourceError::Template {
            template: ".krew.yaml".to_string(),
            reason: "unterminated action".to_string(),
        };
        assert!(err.source().is_none());
        assert!(err.to_string().contains(".krew.yaml"));
    }
}
