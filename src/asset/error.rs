//! Asset-level diagnostics.
//!
//! None of these abort a render: the pipeline records them and moves on, so a
//! broken reference only costs its own tag.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::debug;

use super::AssetType;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("`{reference}` is not a css or js asset")]
    NotAnAsset { reference: String },

    #[error("cannot resolve {ty} asset `{reference}` under `{}`", .base.display())]
    Unresolved {
        ty: AssetType,
        reference: String,
        base: PathBuf,
    },

    #[error("public base path `{}` is not a directory", .0.display())]
    InvalidBasePath(PathBuf),

    #[error("failed to create `{}`", .0.display())]
    CreateDir(PathBuf, #[source] io::Error),

    #[error("failed to read `{}`", .0.display())]
    Read(PathBuf, #[source] io::Error),

    #[error("failed to minify {ty} bundle: {reason}")]
    Minify { ty: AssetType, reason: String },

    #[error("failed to write `{}`", .0.display())]
    Write(PathBuf, #[source] io::Error),
}

/// Log a diagnostic and keep it for the caller.
pub fn report(diagnostics: &mut Vec<AssetError>, err: AssetError) {
    debug!("assets"; "{}", err);
    diagnostics.push(err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_asset_error_display() {
        let err = AssetError::Unresolved {
            ty: AssetType::Css,
            reference: "missing.css".into(),
            base: PathBuf::from("/srv/public"),
        };
        assert_eq!(
            err.to_string(),
            "cannot resolve css asset `missing.css` under `/srv/public`"
        );

        let err = AssetError::CreateDir(
            PathBuf::from("/ro/compressed"),
            io::Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/ro/compressed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
