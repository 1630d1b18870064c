//! Asset type and output kind definitions.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `.css` / `.js` suffix, optionally followed by a query string.
static ASSET_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(css|js)(\?.*)?$").unwrap());

/// Kind of bundled asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Css,
    Js,
}

impl AssetType {
    /// Every asset type, in flush order.
    pub const ALL: [Self; 2] = [Self::Css, Self::Js];

    /// Classify a reference by its suffix, ignoring a trailing query string.
    ///
    /// Returns `None` for anything that is neither css nor js.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let caps = ASSET_SUFFIX.captures(reference)?;
        match &caps[1] {
            "css" => Some(Self::Css),
            "js" => Some(Self::Js),
            _ => None,
        }
    }

    /// File extension of the compressed artifact.
    pub const fn ext(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    /// Conventional subdirectory under the public root (`css/`, `js/`).
    pub const fn dir_name(self) -> &'static str {
        self.ext()
    }

    /// Output bucket for bundle and remote tags of this type.
    pub const fn bundle_output(self) -> OutputKind {
        match self {
            Self::Css => OutputKind::Css,
            Self::Js => OutputKind::Js,
        }
    }

    /// Output bucket for inline snippets of this type.
    pub const fn inline_output(self) -> OutputKind {
        match self {
            Self::Css => OutputKind::InlineCss,
            Self::Js => OutputKind::InlineJs,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

/// Output bucket read back by page templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Css,
    Js,
    InlineCss,
    InlineJs,
}

impl OutputKind {
    pub const ALL: [Self; 4] = [Self::Css, Self::Js, Self::InlineCss, Self::InlineJs];

    /// Template-facing name of the bucket.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
            Self::InlineCss => "inlineCss",
            Self::InlineJs => "inlineJs",
        }
    }

    /// Look a bucket up by its template-facing name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reference() {
        assert_eq!(AssetType::from_reference("style.css"), Some(AssetType::Css));
        assert_eq!(AssetType::from_reference("app.js"), Some(AssetType::Js));
        assert_eq!(AssetType::from_reference("app.js?v=2"), Some(AssetType::Js));
        assert_eq!(
            AssetType::from_reference("https://cdn.example.com/x.css?v=1&y=2"),
            Some(AssetType::Css)
        );
        assert_eq!(AssetType::from_reference("logo.bmp"), None);
        assert_eq!(AssetType::from_reference("app.jsx"), None);
        assert_eq!(AssetType::from_reference("style.css.map"), None);
        assert_eq!(AssetType::from_reference("css"), None);
    }

    #[test]
    fn test_output_kind_names() {
        for kind in OutputKind::ALL {
            assert_eq!(OutputKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(OutputKind::from_name("inlinecss"), None);
        assert_eq!(AssetType::Js.inline_output(), OutputKind::InlineJs);
        assert_eq!(AssetType::Css.bundle_output(), OutputKind::Css);
    }
}
