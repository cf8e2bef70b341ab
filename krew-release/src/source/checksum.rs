//! SHA-256 checksums for downloaded assets.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::error::{SourceError, SourceResult};
use super::Downloader;

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Lowercase hex SHA-256 of the file at `path`, read in 64 KiB chunks.
pub fn calculate_file_checksum(path: &Path) -> SourceResult<String> {
    let mut file = File::open(path).map_err(|e| SourceError::io(path, e))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| SourceError::io(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Download `uri` with `downloader` and return the SHA-256 of its bytes.
///
/// The download is named after the current Unix timestamp and is removed
/// before returning, whether or not hashing succeeded.
pub fn hash_from_reference<D: Downloader + ?Sized>(
    downloader: &D,
    uri: &str,
) -> SourceResult<String> {
    let name = Utc::now().timestamp().to_string();
    let file = downloader.fetch(uri, &name)?;

    let checksum = calculate_file_checksum(file.path());

    let dir = file.dir().to_path_buf();
    if let Err(e) = file.remove() {
        warn!("failed to remove {}: {}", dir.display(), e);
    }

    let checksum = checksum?;
    debug!("sha256 of {} is {}", uri, checksum);
    Ok(checksum)
}
