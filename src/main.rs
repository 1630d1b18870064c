//! assetpack - bundle css/js assets and print their html tags.

use anyhow::Result;
use clap::{ColorChoice, Parser};

use assetpack::cli::{Cli, Commands, build::build, clean::clean};
use assetpack::config::AssetsConfig;
use assetpack::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = AssetsConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Build { args } => build(&config, args),
        Commands::Clean => clean(&config),
    }
}
