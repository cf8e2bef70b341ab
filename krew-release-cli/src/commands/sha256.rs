//! `sha256` command: print the checksum of a release asset.

use krew_release::config::ConfigFile;
use krew_release::source::hash_from_reference;

use super::common::{downloader, resolve_strategy, Strategy};
use crate::error::CliError;

/// Run the sha256 command.
pub fn run(uri: &str, strategy: Option<Strategy>, config: &ConfigFile) -> Result<(), CliError> {
    let downloader = downloader(resolve_strategy(strategy, config), config)?;
    let sha256 = hash_from_reference(&*downloader, uri)?;
    println!("{}  {}", sha256, uri);
    Ok(())
}
