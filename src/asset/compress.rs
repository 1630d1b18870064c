//! Cached bundle compression.
//!
//! Each asset type with registered files becomes one artifact:
//!
//! ```text
//! <output>/compressed/<key>.css
//! <output>/compressed/<key>.js
//! ```
//!
//! `key` hashes the ordered, colon-joined resolved locations, so any change
//! to the set or its order lands in a new file. An existing artifact is
//! reused as-is unless debug mode is on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::utils::hash;
use crate::utils::path::to_url_path;

use super::error::report;
use super::{AssetError, AssetLocation, AssetType, Attributes, Minifiers, OutputBuilder};

/// Artifact directory under the output path.
pub const COMPRESSED_DIR: &str = "compressed";

/// Cache key of an ordered location list.
pub fn cache_key(files: &[AssetLocation]) -> String {
    let joined = files
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(":");
    hash::hex_digest(&joined)
}

/// Artifact file name for a key.
pub fn artifact_name(key: &str, ty: AssetType) -> String {
    format!("{key}.{}", ty.ext())
}

/// URI prefix of `output_path` as seen from the app root.
///
/// `/srv/app/public` under `/srv/app` gives `/public`; a path outside the
/// app root (or the root itself) gives `""`.
pub fn default_uri_prefix(output_path: &Path, app_root: &Path) -> String {
    match output_path.strip_prefix(app_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => format!("/{}", to_url_path(rel)),
        _ => String::new(),
    }
}

/// What happened to one type's bundle during a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleStatus {
    /// Artifact existed; minifier skipped.
    Cached,
    /// Artifact (re)built.
    Built,
    /// Minifier failed; no bundle tag rendered.
    Failed,
    /// Only remote URLs registered; nothing to minify.
    RemoteOnly,
}

#[derive(Debug, Clone)]
pub struct BundleReport {
    pub ty: AssetType,
    pub key: String,
    pub artifact: PathBuf,
    /// URI of the rendered bundle tag, if any.
    pub uri: Option<String>,
    pub status: BundleStatus,
}

/// Summary of one flush.
#[derive(Debug, Clone, Default)]
pub struct FlushReport {
    pub bundles: Vec<BundleReport>,
    /// Inline snippets rendered.
    pub inline: usize,
}

impl FlushReport {
    pub fn bundle(&self, ty: AssetType) -> Option<&BundleReport> {
        self.bundles.iter().find(|b| b.ty == ty)
    }
}

/// Builds (or reuses) the artifact of one asset type.
pub struct CachingCompressor<'a> {
    pub output_path: &'a Path,
    pub uri_prefix: &'a str,
    pub debug: bool,
    pub minifiers: &'a Minifiers,
}

impl CachingCompressor<'_> {
    /// Compress `files` of type `ty` and render the resulting tags.
    ///
    /// Remote locations are rendered as their own tags ahead of the bundle
    /// and never reach the minifier.
    pub fn compress(
        &self,
        ty: AssetType,
        files: &[AssetLocation],
        attrs: &Attributes,
        output: &mut OutputBuilder,
        diagnostics: &mut Vec<AssetError>,
    ) -> BundleReport {
        let key = cache_key(files);
        let name = artifact_name(&key, ty);
        let dir = self.output_path.join(COMPRESSED_DIR);
        let artifact = dir.join(&name);
        let uri = format!("{}/{COMPRESSED_DIR}/{name}", self.uri_prefix);

        let report_for = |status, uri| BundleReport {
            ty,
            key: key.clone(),
            artifact: artifact.clone(),
            uri,
            status,
        };

        for location in files {
            if let AssetLocation::Remote(url) = location {
                render(output, ty, url, attrs);
            }
        }

        let sources: Vec<&Path> = files.iter().filter_map(AssetLocation::as_file).collect();
        if sources.is_empty() {
            return report_for(BundleStatus::RemoteOnly, None);
        }

        if !self.debug && artifact.is_file() {
            render(output, ty, &uri, attrs);
            return report_for(BundleStatus::Cached, Some(uri));
        }

        if !dir.is_dir()
            && let Err(e) = create_dir(&dir)
        {
            // not fatal: the write below reports the real failure
            report(diagnostics, AssetError::CreateDir(dir.clone(), e));
        }

        match self.minifiers.get(ty).minify(&sources, &artifact) {
            Ok(()) => {
                set_mode(&artifact, 0o644);
                let uri = if self.debug {
                    format!("{uri}?{}", unix_seconds())
                } else {
                    uri
                };
                render(output, ty, &uri, attrs);
                report_for(BundleStatus::Built, Some(uri))
            }
            Err(e) => {
                report(diagnostics, e);
                report_for(BundleStatus::Failed, None)
            }
        }
    }
}

/// Render a bundle or remote tag into its output bucket.
fn render(output: &mut OutputBuilder, ty: AssetType, uri: &str, attrs: &Attributes) {
    match ty {
        AssetType::Css => output.render_link(uri, attrs),
        AssetType::Js => output.render_script(uri, attrs),
    }
}

fn create_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}

/// Best-effort permission change; failures are ignored.
fn set_mode(path: &Path, mode: u32) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).ok();
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
