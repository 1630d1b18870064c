//! `assetpack build`: register, flush, print.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;

use crate::asset::{BundleStatus, OutputKind};
use crate::config::AssetsConfig;
use crate::log;
use crate::pipeline::AssetPipeline;
use crate::utils::path::normalize_path;

use super::BuildArgs;

pub fn build(config: &AssetsConfig, args: &BuildArgs) -> Result<()> {
    let mut assets = config.build_assets();
    if let Some(debug) = args.debug {
        assets.set_debug(debug);
    }
    config.register_all(&mut assets);

    let output = output_path(config, args);
    let uri_prefix = args.uri_prefix.as_deref().or(config.uri_prefix.as_deref());
    let report = assets.flush(output.as_deref(), uri_prefix);

    for bundle in &report.bundles {
        match bundle.status {
            BundleStatus::Built => log!("flush"; "built {}", bundle.artifact.display()),
            BundleStatus::Cached => log!("flush"; "cached {}", bundle.artifact.display()),
            BundleStatus::Failed => log!("error"; "{} bundle failed", bundle.ty),
            BundleStatus::RemoteOnly => {}
        }
    }
    for diagnostic in assets.diagnostics() {
        log!("warn"; "{}", diagnostic);
    }

    let kinds = match args.kind.as_deref().and_then(OutputKind::from_name) {
        Some(kind) => vec![kind],
        None => OutputKind::ALL.to_vec(),
    };

    let mut stdout = io::stdout().lock();
    for kind in kinds {
        let html = assets.output(kind);
        if !html.is_empty() {
            writeln!(stdout, "{html}")?;
        }
    }
    Ok(())
}

/// `--output` is taken relative to the working directory, like any CLI path.
fn output_path(config: &AssetsConfig, args: &BuildArgs) -> Option<PathBuf> {
    args.output
        .as_deref()
        .map(normalize_path)
        .or_else(|| config.output_path())
}
