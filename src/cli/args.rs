//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// Template-facing output kinds accepted by `--kind`.
const KINDS: [&str; 4] = ["css", "js", "inlineCss", "inlineJs"];

/// assetpack: css/js bundling with cached, content-keyed artifacts
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Register configured assets, flush, and print the html tags
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Remove compressed artifacts from the output directory
    #[command(visible_alias = "c")]
    Clean,
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Force rebuild and append a cache-busting query (overrides config)
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub debug: Option<bool>,

    /// Print only one output kind
    #[arg(short, long, value_parser = KINDS)]
    pub kind: Option<String>,

    /// Output directory (overrides config)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// URI prefix of the output directory (overrides config)
    #[arg(short = 'u', long)]
    pub uri_prefix: Option<String>,
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
    fn test_parse_build() {
        let cli = Cli::parse_from(["assetpack", "build", "--debug", "--kind", "inlineJs"]);
        let Commands::Build { args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.debug, Some(true));
        assert_eq!(args.kind.as_deref(), Some("inlineJs"));
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));

        assert!(Cli::try_parse_from(["assetpack", "build", "--kind", "images"]).is_err());
    }

    #[test]
    fn test_parse_clean_with_config() {
        let cli = Cli::parse_from(["assetpack", "-C", "site/assets.toml", "clean"]);
        assert!(matches!(cli.command, Commands::Clean));
        assert_eq!(cli.config, PathBuf::from("site/assets.toml"));
    }
}
