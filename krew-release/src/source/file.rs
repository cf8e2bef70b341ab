//! Per-call temp files holding downloaded assets.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::error::{SourceError, SourceResult};

/// Buffer size for streaming response bodies to disk (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Prefix for the directories created by downloaders.
const TEMP_DIR_PREFIX: &str = "krew-release-";

/// A downloaded asset living in its own temp directory.
///
/// Nothing removes it automatically. The holder calls [`DownloadedFile::remove`]
/// once the bytes have been consumed.
#[derive(Debug)]
pub struct DownloadedFile {
    dir: PathBuf,
    path: PathBuf,
}

impl DownloadedFile {
    /// Path of the downloaded file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory created for this download.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the whole file as UTF-8 text.
    pub fn read_to_string(&self) -> SourceResult<String> {
        fs::read_to_string(&self.path).map_err(|e| SourceError::io(&self.path, e))
    }

    /// Delete the file together with its directory.
    pub fn remove(self) -> SourceResult<()> {
        fs::remove_dir_all(&self.dir).map_err(|e| SourceError::io(&self.dir, e))
    }
}

/// Stream `reader` into `<fresh temp dir>/<name>`.
///
/// `uri` is only used for error context. When streaming fails the directory
/// is removed again, so a failed download leaves nothing behind.
pub(crate) fn write_temp_file<R: Read>(
    mut reader: R,
    name: &str,
    uri: &str,
) -> SourceResult<DownloadedFile> {
    let dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir()
        .map_err(|e| SourceError::io(std::env::temp_dir(), e))?;

    let path = dir.path().join(file_name(name));
    let file = File::create(&path).map_err(|e| SourceError::io(&path, e))?;

    let mut writer = BufWriter::new(file);
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| {
            SourceError::transport(
                uri,
                format!("failed to save file {}. error: {}", path.display(), e),
            )
        })?;

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|e| SourceError::io(&path, e))?;

        written += bytes_read as u64;
    }

    writer.flush().map_err(|e| SourceError::io(&path, e))?;
    drop(writer);

    let dir = dir.keep();
    info!("downloaded file {} ({} bytes)", path.display(), written);

    Ok(DownloadedFile { dir, path })
}

/// Keep only the final path component so a name can never escape its directory.
fn file_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("asset")
}
