//! Krew index layout and manifest updates.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::source::{Downloader, HttpDownloader, SourceError, SourceResult};
use crate::template::{render, ReleaseRequest, TemplateSource};

/// Owner of the upstream krew index.
pub const DEFAULT_INDEX_OWNER: &str = "artificialinc";

/// Name of the upstream krew index repository.
pub const DEFAULT_INDEX_NAME: &str = "artificial-krew-repository";

/// Environment variable overriding the index owner.
pub const INDEX_OWNER_ENV: &str = "UPSTREAM_KREW_INDEX_REPO_OWNER";

/// Environment variable overriding the index repository name.
pub const INDEX_NAME_ENV: &str = "UPSTREAM_KREW_INDEX_REPO_NAME";

/// Directory of plugin manifests inside the index.
const PLUGINS_DIR: &str = "plugins";

/// File name of a plugin's manifest in the index.
pub fn plugin_file_name(plugin_name: &str) -> String {
    format!("{}.yaml", plugin_name)
}

/// Location of a plugin's manifest in a checked-out index.
pub fn manifest_path(index_dir: &Path, plugin_name: &str) -> PathBuf {
    index_dir.join(PLUGINS_DIR).join(plugin_file_name(plugin_name))
}

/// The index repository pull requests are opened against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRepository {
    pub owner: String,
    pub name: String,
}

impl Default for IndexRepository {
    fn default() -> Self {
        Self {
            owner: DEFAULT_INDEX_OWNER.to_string(),
            name: DEFAULT_INDEX_NAME.to_string(),
        }
    }
}

impl IndexRepository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Default index with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `UPSTREAM_KREW_INDEX_REPO_OWNER` and `UPSTREAM_KREW_INDEX_REPO_NAME`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(INDEX_OWNER_ENV).ok(),
            std::env::var(INDEX_NAME_ENV).ok(),
        )
    }

    /// Replace owner and name with the given values when they are non-empty.
    pub fn with_overrides(mut self, owner: Option<String>, name: Option<String>) -> Self {
        if let Some(owner) = owner.filter(|o| !o.is_empty()) {
            self.owner = owner;
        }
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.name = name;
        }

        if self != Self::default() {
            info!("krew index repository overridden to {}", self.full_name());
        }
        self
    }

    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Render the plugin template for `request` and write it to `dest`.
///
/// Remote templates are fetched with `http`; release assets are hashed with
/// `downloader`. Parent directories of `dest` are created.
pub fn update_plugin_manifest<D: Downloader + ?Sized>(
    http: &HttpDownloader,
    downloader: &D,
    source: &TemplateSource,
    dest: &Path,
    request: &ReleaseRequest,
) -> SourceResult<()> {
    let text = source.read(http)?;
    let manifest = render(downloader, &source.to_string(), &text, request)?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SourceError::io(parent, e))?;
    }
    fs::write(dest, &manifest).map_err(|e| SourceError::io(dest, e))?;

    info!(
        "updated {} ({})",
        dest.display(),
        request.commit_message()
    );
    Ok(())
}
