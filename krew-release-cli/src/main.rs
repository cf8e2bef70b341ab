//! krew-release CLI - Command-line interface
//!
//! Renders krew plugin manifests for new releases and inspects release assets.

mod commands;
mod error;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::common::{resolve_config, Strategy};
use commands::render::RenderArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "krew-release")]
#[command(about = "Render krew plugin manifests for new GitHub releases", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: <config dir>/krew-release/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Token for GitHub API requests
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render a plugin manifest template for a release tag
    Render(RenderArgs),

    /// Download a release asset and print its SHA-256
    Sha256 {
        /// Release asset URL
        uri: String,

        /// How the asset is downloaded (default: config file, else direct)
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
    },

    /// Split a release asset URL into owner, repo, tag and asset
    ParseAsset {
        /// Release asset URL
        uri: String,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::ParseAsset { uri } => commands::parse_asset::run(&uri),
        Commands::Sha256 { uri, strategy } => {
            let config = resolve_config(cli.config.as_deref(), cli.github_token)?;
            commands::sha256::run(&uri, strategy, &config)
        }
        Commands::Render(args) => {
            let config = resolve_config(cli.config.as_deref(), cli.github_token)?;
            commands::render::run(args, &config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "krew-release",
            "render",
            "--template",
            ".krew.yaml",
            "--tag",
            "v0.0.2",
            "--value",
            "Arch=amd64",
            "--strategy",
            "github",
        ])
        .unwrap();

        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.template.as_deref(), Some(".krew.yaml"));
                assert_eq!(args.tag, "v0.0.2");
                assert_eq!(args.values, vec![("Arch".to_string(), "amd64".to_string())]);
                assert_eq!(args.strategy, Some(Strategy::Github));
            }
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn test_render_requires_tag() {
        assert!(Cli::try_parse_from(["krew-release", "render", "--template", "t.yaml"]).is_err());
    }

    #[test]
    fn test_index_requires_plugin_name() {
        assert!(Cli::try_parse_from([
            "krew-release",
            "render",
            "--tag",
            "v1",
            "--index",
            "krew-index",
        ])
        .is_err());
    }

    #[test]
    fn test_parse_sha256_with_global_flags() {
        let cli = Cli::try_parse_from([
            "krew-release",
            "sha256",
            "https://example.com/a.tar.gz",
            "-v",
            "--config",
            "custom.ini",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.ini")));
        assert!(matches!(
            cli.command,
            Commands::Sha256 { strategy: None, .. }
        ));
    }
}
