//! krew-release - render krew plugin manifests for new releases
//!
//! When a kubectl plugin publishes a release, its `.krew.yaml` template is
//! rendered with the release tag, every referenced asset is downloaded and
//! hashed, and the resulting manifest is written into a krew index checkout.
//!
//! # Modules
//!
//! - [`source`] - asset downloads (direct and via the GitHub API) and SHA-256
//! - [`template`] - the manifest template language and indentation fixes
//! - [`release`] - release events and what they publish
//! - [`krew`] - index layout and manifest updates
//! - [`config`] - INI configuration file

pub mod config;
pub mod krew;
pub mod release;
pub mod source;
pub mod template;
