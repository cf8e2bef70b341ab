//! Logging setup.
//!
//! `RUST_LOG` wins when set. Otherwise `-v` or `LOG_LEVEL=debug` selects
//! debug output and everything else logs at info. Logs go to stderr so
//! rendered manifests on stdout stay clean.

use tracing_subscriber::EnvFilter;

/// Environment variable for the coarse log level.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Install the global subscriber.
pub fn init(verbose: bool) {
    let level = default_level(verbose, std::env::var(LOG_LEVEL_ENV).ok().as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_level(verbose: bool, log_level: Option<&str>) -> &'static str {
    let debug = log_level.is_some_and(|level| level.trim().eq_ignore_ascii_case("debug"));
    if verbose || debug {
        "debug"
    } else {
        "info"
    }
}
