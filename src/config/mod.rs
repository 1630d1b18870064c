//! Bundle configuration for `assets.toml`.
//!
//! # Example
//!
//! ```toml
//! debug = false
//! root = "."                  # app root, default: config file directory
//! public = "public"           # public base path override
//! output = "public"           # where `compressed/` is written
//! uri-prefix = "/public"      # URI of the output directory
//! css = ["style.css", "https://cdn.example.com/reset.css"]
//! js = ["app.js"]
//! inline-js = ["console.log(1)"]
//!
//! [minify]
//! css = "native"              # native | concat
//!
//! [import-extensions]
//! png = "data:image/png"
//!
//! [attributes]
//! js = ["defer", { crossorigin = "anonymous" }]
//! ```
//!
//! Relative paths are resolved against the config file's directory.

mod error;

pub use error::ConfigError;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::asset::{
    AssetType, Attribute, Attributes, CssMinifier, ImportExtensions, JsMinifier,
    default_import_extensions,
};
use crate::pipeline::{AssetPipeline, Assets};
use crate::utils::path::{normalize_path, resolve_path};

/// Default config file name.
pub const CONFIG_FILE: &str = "assets.toml";

/// Root configuration structure representing assets.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AssetsConfig {
    /// Directory relative paths are resolved against (internal use only)
    #[serde(skip)]
    pub base_dir: PathBuf,

    /// Rebuild on every flush and append a cache-busting query
    pub debug: bool,

    /// Application root, used for public root discovery and URI prefixes
    pub root: Option<PathBuf>,

    /// Public base path override
    pub public: Option<PathBuf>,

    /// Flush output directory (default: public root)
    pub output: Option<PathBuf>,

    /// URI of the output directory (default: derived from the app root)
    pub uri_prefix: Option<String>,

    pub css: Vec<String>,
    pub js: Vec<String>,
    pub inline_css: Vec<String>,
    pub inline_js: Vec<String>,

    pub minify: MinifySection,

    /// Extension → data URI prefix for css `url()` inlining
    pub import_extensions: Option<ImportExtensions>,

    pub attributes: AttributesSection,
}

/// `[minify]` section: bundler per asset type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifySection {
    pub css: MinifyMode,
    pub js: MinifyMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyMode {
    /// lightningcss / oxc
    #[default]
    Native,
    /// Concatenate only
    Concat,
}

/// `[attributes]` section: extra attributes on bundle and remote tags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttributesSection {
    pub css: Vec<AttributeSpec>,
    pub js: Vec<AttributeSpec>,
}

/// `"defer"` or `{ crossorigin = "anonymous" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AttributeSpec {
    Flag(String),
    Pairs(BTreeMap<String, String>),
}

fn to_attributes(specs: &[AttributeSpec]) -> Attributes {
    specs
        .iter()
        .flat_map(|spec| match spec {
            AttributeSpec::Flag(name) => vec![Attribute::Flag(name.clone())],
            AttributeSpec::Pairs(pairs) => pairs
                .iter()
                .map(|(k, v)| Attribute::Pair(k.clone(), v.clone()))
                .collect(),
        })
        .collect()
}

impl AssetsConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let path = normalize_path(path);
        let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Self::parse(&content, base_dir)
    }

    /// Parse and validate config content, resolving paths against `base_dir`.
    pub fn parse(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let root = self.app_root();
        if !root.is_dir() {
            return Err(ConfigError::validation(
                "root",
                format!("`{}` is not a directory", root.display()),
            ));
        }
        if let Some(public) = self.public_path()
            && !public.is_dir()
        {
            return Err(ConfigError::validation(
                "public",
                format!("`{}` is not a directory", public.display()),
            ));
        }
        if let Some(exts) = &self.import_extensions
            && let Some((ext, _)) = exts.iter().find(|(_, mime)| !mime.starts_with("data:"))
        {
            return Err(ConfigError::validation(
                "import-extensions",
                format!("`{ext}` must map to a `data:` prefix"),
            ));
        }
        Ok(())
    }

    pub fn app_root(&self) -> PathBuf {
        let root = self.root.as_deref().unwrap_or(Path::new("."));
        normalize_path(&resolve_path(root, &self.base_dir))
    }

    pub fn public_path(&self) -> Option<PathBuf> {
        self.public.as_deref().map(|p| resolve_path(p, &self.base_dir))
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output
            .as_deref()
            .map(|p| normalize_path(&resolve_path(p, &self.base_dir)))
    }

    /// Build a pipeline with every setting applied and nothing registered.
    pub fn build_assets(&self) -> Assets {
        let mut assets = Assets::new(self.app_root()).with_debug(self.debug);

        if let Some(public) = self.public_path() {
            assets.set_public_base_path(&public.to_string_lossy());
        }

        let imports = self
            .import_extensions
            .clone()
            .unwrap_or_else(default_import_extensions);
        let css = CssMinifier::new(imports).with_minify(self.minify.css == MinifyMode::Native);
        let js = JsMinifier::default().with_minify(self.minify.js == MinifyMode::Native);
        assets.set_minifier(AssetType::Css, Box::new(css));
        assets.set_minifier(AssetType::Js, Box::new(js));

        assets.set_attributes(AssetType::Css, to_attributes(&self.attributes.css));
        assets.set_attributes(AssetType::Js, to_attributes(&self.attributes.js));
        assets
    }

    /// Register every configured file and snippet.
    pub fn register_all(&self, assets: &mut Assets) {
        assets.register_many(&self.css, None);
        assets.register_many(&self.js, None);
        for content in &self.inline_css {
            assets.register_inline(AssetType::Css, content);
        }
        for content in &self.inline_js {
            assets.register_inline(AssetType::Js, content);
        }
    }
}
