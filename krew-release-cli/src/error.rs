//! CLI error type.

use std::path::PathBuf;

use krew_release::source::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Bad configuration file or setting.
    #[error("configuration error: {0}")]
    Config(String),

    /// Arguments that parse but do not make sense together.
    #[error("{0}")]
    Usage(String),

    /// Download, checksum or rendering failure.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Writing the result failed.
    #[error("failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Print the error and its causes to stderr, then exit with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        let mut cause = std::error::Error::source(self);
        while let Some(e) = cause {
            eprintln!("  caused by: {}", e);
            cause = e.source();
        }

        std::process::exit(1);
    }
}
