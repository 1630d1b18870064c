//! Reference classification and path resolution.
//!
//! A reference is a bare filename (`style.css`), a path (`vendor/app.js`,
//! `/srv/www/app.js`) or a remote URL. Local references are looked up in
//! this order, first hit wins:
//!
//! ```text
//! reference                      # absolute or cwd-relative, canonicalized
//! <base>/reference
//! <base>/<css|js>/reference      # type subdirectory convention
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::utils::path::{clean_path, is_remote_url, normalize_path, strip_query};

use super::AssetType;

/// Public root candidates under the app root, in priority order.
const PUBLIC_DIRS: [&str; 2] = ["public", "assets"];

/// Where a registered reference points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    /// Filesystem-verified source file.
    File(PathBuf),
    /// Remote URL, rendered as-is and never minified.
    Remote(String),
}

impl AssetLocation {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Remote(_) => None,
        }
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// Resolves references against the public root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Directory of the running application.
    app_root: PathBuf,
    /// Discovered (or overridden) public root; rechecked before every use.
    public_root: Option<PathBuf>,
}

impl PathResolver {
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
            public_root: None,
        }
    }

    /// Resolver rooted at the process working directory.
    pub fn from_cwd() -> Self {
        Self::new(normalize_path(Path::new(".")))
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    /// Public root used when no base path is given.
    ///
    /// Prefers `<app>/public`, then `<app>/assets`, then the app root. The
    /// result is cached until the cached directory disappears.
    pub fn public_root(&mut self) -> PathBuf {
        if let Some(root) = &self.public_root
            && root.is_dir()
        {
            return root.clone();
        }

        let root = PUBLIC_DIRS
            .iter()
            .map(|dir| self.app_root.join(dir))
            .find(|dir| dir.is_dir())
            .unwrap_or_else(|| self.app_root.clone());

        self.public_root = Some(root.clone());
        root
    }

    /// Override the public root. Ignored unless `path` is a directory.
    pub fn set_public_root(&mut self, path: &str) -> bool {
        let path = Path::new(clean_path(path));
        if !path.is_dir() {
            return false;
        }
        self.public_root = Some(path.to_path_buf());
        true
    }

    /// Classify and locate a reference.
    ///
    /// Returns the type alone (`Some((ty, None))`) when the reference is an
    /// asset but no candidate file exists, and `None` when it is not an asset.
    pub fn resolve(
        &self,
        reference: &str,
        base: &Path,
    ) -> Option<(AssetType, Option<AssetLocation>)> {
        let ty = AssetType::from_reference(reference)?;

        if is_remote_url(reference) {
            return Some((ty, Some(AssetLocation::Remote(reference.to_owned()))));
        }

        Some((ty, Self::locate(strip_query(reference), base, ty)))
    }

    fn locate(reference: &str, base: &Path, ty: AssetType) -> Option<AssetLocation> {
        let direct = Path::new(reference);
        if direct.is_file() {
            return Some(AssetLocation::File(normalize_path(direct)));
        }

        let relative = reference.trim_start_matches(['/', '\\']);
        [base.join(relative), base.join(ty.dir_name()).join(relative)]
            .into_iter()
            .find(|candidate| candidate.is_file())
            .map(AssetLocation::File)
    }
}
