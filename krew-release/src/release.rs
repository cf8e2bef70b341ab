//! Release events that trigger a manifest update.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::template::{ReleaseRequest, TemplateSource};

/// A published release of a plugin repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub owner: String,
    pub repo: String,
    pub tag: String,
    #[serde(default)]
    pub prerelease: bool,
    /// Names of the files attached to the release.
    #[serde(default)]
    pub assets: Vec<String>,
}

impl ReleaseEvent {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    pub fn with_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets = assets.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a file called `name` is attached to the release.
    pub fn has_asset(&self, name: &str) -> bool {
        self.assets.iter().any(|a| a == name)
    }

    /// Pre-releases and releases without assets never reach the index.
    pub fn should_publish(&self) -> bool {
        if self.prerelease {
            info!(
                "{}/{} {} is a prerelease, not publishing",
                self.owner, self.repo, self.tag
            );
            return false;
        }
        if self.assets.is_empty() {
            info!(
                "{}/{} {} has no assets, not publishing",
                self.owner, self.repo, self.tag
            );
            return false;
        }
        true
    }

    /// Request for rendering `plugin_name`'s manifest at this release.
    pub fn to_request(&self, plugin_name: &str) -> ReleaseRequest {
        ReleaseRequest::new(&self.tag)
            .with_plugin_name(plugin_name)
            .with_plugin_owner(&self.owner)
            .with_plugin_repo(&self.repo)
    }

    /// The repository's `.krew.yaml`.
    pub fn template_source(&self) -> TemplateSource {
        TemplateSource::for_repository(&self.owner, &self.repo)
    }
}
