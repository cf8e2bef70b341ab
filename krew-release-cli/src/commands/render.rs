//! `render` command: render a plugin manifest template for a release.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use krew_release::config::ConfigFile;
use krew_release::krew::{manifest_path, update_plugin_manifest};
use krew_release::source::HttpDownloader;
use krew_release::template::{render, ReleaseRequest, TemplateSource};
use tracing::info;

use super::common::{downloader, parse_key_value, resolve_strategy, Strategy};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template path or http(s) URL (default: the repository's .krew.yaml)
    #[arg(long, value_name = "PATH|URL")]
    pub template: Option<String>,

    /// Release tag to render
    #[arg(long)]
    pub tag: String,

    /// Plugin name
    #[arg(long)]
    pub plugin_name: Option<String>,

    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Extra template value, available as {{ .KEY }} (repeatable)
    #[arg(long = "value", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub values: Vec<(String, String)>,

    /// How release assets are downloaded (default: config file, else direct)
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Write the manifest to this file instead of stdout
    #[arg(long, value_name = "FILE", conflicts_with = "index")]
    pub output: Option<PathBuf>,

    /// Write the manifest into this krew index checkout (plugins/<name>.yaml)
    #[arg(long, value_name = "DIR", requires = "plugin_name")]
    pub index: Option<PathBuf>,
}

impl RenderArgs {
    fn request(&self) -> ReleaseRequest {
        let mut request = ReleaseRequest::new(&self.tag)
            .with_plugin_name(self.plugin_name.clone().unwrap_or_default())
            .with_plugin_owner(self.owner.clone().unwrap_or_default())
            .with_plugin_repo(self.repo.clone().unwrap_or_default());

        for (key, value) in &self.values {
            request = request.with_value(key, value);
        }
        request
    }

    fn source(&self) -> Result<TemplateSource, CliError> {
        if let Some(location) = &self.template {
            return Ok(TemplateSource::parse(location));
        }

        match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => Ok(TemplateSource::for_repository(owner, repo)),
            _ => Err(CliError::Usage(
                "either --template or both --owner and --repo are required".to_string(),
            )),
        }
    }

    fn destination(&self) -> Option<PathBuf> {
        if let Some(output) = &self.output {
            return Some(output.clone());
        }
        match (&self.index, &self.plugin_name) {
            (Some(index), Some(name)) => Some(manifest_path(index, name)),
            _ => None,
        }
    }
}

/// Run the render command.
pub fn run(args: RenderArgs, config: &ConfigFile) -> Result<(), CliError> {
    let source = args.source()?;
    let request = args.request();

    let strategy = resolve_strategy(args.strategy, config);
    let http = HttpDownloader::new(config.download.clone())?;
    let downloader = downloader(strategy, config)?;
    info!(
        "rendering {} at {} with {} downloads",
        source, request.tag_name, strategy
    );

    match args.destination() {
        Some(dest) => {
            update_plugin_manifest(&http, &*downloader, &source, &dest, &request)?;
            println!("Wrote {}", dest.display());
            if args.index.is_some() {
                println!(
                    "Commit as \"{}\" for {}",
                    request.commit_message(),
                    config.index.full_name()
                );
            }
        }
        None => {
            let text = source.read(&http)?;
            let manifest = render(&*downloader, &source.to_string(), &text, &request)?;

            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&manifest)
                .and_then(|_| stdout.flush())
                .map_err(|source| CliError::Output {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
    }

    Ok(())
}
