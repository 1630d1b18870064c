//! Per-request asset pipeline.
//!
//! [`Assets`] owns everything one render cycle accumulates: the registry,
//! its dedup set, the rendered output and the diagnostics. Create one per
//! request (or per page/theme bundle); nothing is shared between instances.
//!
//! ```ignore
//! let mut assets = Assets::new("/srv/app");
//! assets.register("style.css", None);
//! assets.register_inline(AssetType::Js, "console.log(1)");
//! assets.flush(None, None);
//! let head = assets.output(OutputKind::Css);
//! ```

use std::path::{Path, PathBuf};

use crate::asset::{
    AssetError, AssetRegistry, AssetType, Attributes, CachingCompressor, FlushReport,
    ImportExtensions, Minifier, Minifiers, OutputBuilder, OutputKind, PathResolver, Registration,
    default_uri_prefix, report,
};
use crate::debug;

/// Register, flush, output.
pub trait AssetPipeline {
    /// Register one file reference or remote URL.
    ///
    /// `base_path` overrides the public root for this reference.
    fn register(&mut self, reference: &str, base_path: Option<&Path>) -> Registration;

    /// Register a literal css/js snippet.
    fn register_inline(&mut self, ty: AssetType, content: &str);

    /// Bundle everything registered so far and render the tags.
    fn flush(&mut self, output_path: Option<&Path>, uri_prefix: Option<&str>) -> FlushReport;

    /// Rendered tags of one kind, newline-joined.
    fn output(&self, kind: OutputKind) -> String;
}

/// Extra attributes for bundle and remote tags, per type.
#[derive(Debug, Clone, Default)]
struct BundleAttributes {
    css: Attributes,
    js: Attributes,
}

impl BundleAttributes {
    fn get(&self, ty: AssetType) -> &Attributes {
        match ty {
            AssetType::Css => &self.css,
            AssetType::Js => &self.js,
        }
    }

    fn set(&mut self, ty: AssetType, attrs: Attributes) {
        match ty {
            AssetType::Css => self.css = attrs,
            AssetType::Js => self.js = attrs,
        }
    }
}

pub struct Assets {
    /// Rebuild on every flush and add a cache-busting query.
    debug: bool,
    resolver: PathResolver,
    registry: AssetRegistry,
    output: OutputBuilder,
    minifiers: Minifiers,
    attributes: BundleAttributes,
    diagnostics: Vec<AssetError>,
}

impl Assets {
    /// Pipeline for the application rooted at `app_root`.
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self::with_resolver(PathResolver::new(app_root))
    }

    /// Pipeline rooted at the process working directory.
    pub fn from_cwd() -> Self {
        Self::with_resolver(PathResolver::from_cwd())
    }

    fn with_resolver(resolver: PathResolver) -> Self {
        Self {
            debug: false,
            resolver,
            registry: AssetRegistry::new(),
            output: OutputBuilder::new(),
            minifiers: Minifiers::default(),
            attributes: BundleAttributes::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Current public root (discovered unless overridden).
    pub fn public_base_path(&mut self) -> PathBuf {
        self.resolver.public_root()
    }

    /// Override the public root; ignored (with a diagnostic) unless it is a directory.
    pub fn set_public_base_path(&mut self, path: &str) -> bool {
        let accepted = self.resolver.set_public_root(path);
        if !accepted {
            report(
                &mut self.diagnostics,
                AssetError::InvalidBasePath(PathBuf::from(path)),
            );
        }
        accepted
    }

    /// Data-URI import map of the current css minifier.
    ///
    /// Applies to whichever minifier is installed; one without an import
    /// map (e.g. a custom [`Minifier`]) keeps working unchanged.
    pub fn set_import_extensions(&mut self, extensions: ImportExtensions) {
        self.minifiers
            .get_mut(AssetType::Css)
            .set_import_extensions(extensions);
    }

    pub fn set_minifier(&mut self, ty: AssetType, minifier: Box<dyn Minifier>) {
        self.minifiers.set(ty, minifier);
    }

    /// Attributes added to every bundle and remote tag of `ty`.
    pub fn set_attributes(&mut self, ty: AssetType, attrs: Attributes) {
        self.attributes.set(ty, attrs);
    }

    /// Register several references against the same base path.
    pub fn register_many<I, S>(
        &mut self,
        references: I,
        base_path: Option<&Path>,
    ) -> Vec<Registration>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        references
            .into_iter()
            .map(|reference| self.register(reference.as_ref(), base_path))
            .collect()
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Problems swallowed so far (unresolved references, failed bundles, ...).
    pub fn diagnostics(&self) -> &[AssetError] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<AssetError> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Output by template-facing name (`css`, `js`, `inlineCss`, `inlineJs`).
    pub fn output_by_name(&self, name: &str) -> String {
        self.output.output_by_name(name)
    }
}

impl AssetPipeline for Assets {
    fn register(&mut self, reference: &str, base_path: Option<&Path>) -> Registration {
        let result = self
            .registry
            .register(&mut self.resolver, reference, base_path);

        match result {
            Registration::Added(ty) => debug!("assets"; "added {} `{}`", ty, reference),
            Registration::Duplicate => debug!("assets"; "already registered `{}`", reference),
            Registration::NotAnAsset => report(
                &mut self.diagnostics,
                AssetError::NotAnAsset {
                    reference: reference.to_owned(),
                },
            ),
            Registration::Unresolved(ty) => {
                let base =
                    base_path.map_or_else(|| self.resolver.public_root(), Path::to_path_buf);
                report(
                    &mut self.diagnostics,
                    AssetError::Unresolved {
                        ty,
                        reference: reference.to_owned(),
                        base,
                    },
                );
            }
        }
        result
    }

    fn register_inline(&mut self, ty: AssetType, content: &str) {
        self.registry.register_inline(ty, content);
    }

    fn flush(&mut self, output_path: Option<&Path>, uri_prefix: Option<&str>) -> FlushReport {
        let output_path =
            output_path.map_or_else(|| self.resolver.public_root(), Path::to_path_buf);
        let uri_prefix = uri_prefix.map_or_else(
            || default_uri_prefix(&output_path, self.resolver.app_root()),
            str::to_owned,
        );

        let compressor = CachingCompressor {
            output_path: &output_path,
            uri_prefix: &uri_prefix,
            debug: self.debug,
            minifiers: &self.minifiers,
        };

        let mut flushed = FlushReport::default();
        for ty in AssetType::ALL {
            let files = self.registry.files(ty);
            if files.is_empty() {
                continue;
            }
            flushed.bundles.push(compressor.compress(
                ty,
                files,
                self.attributes.get(ty),
                &mut self.output,
                &mut self.diagnostics,
            ));
        }

        for content in self.registry.inline(AssetType::Css) {
            self.output.render_inline_style(content);
            flushed.inline += 1;
        }
        for content in self.registry.inline(AssetType::Js) {
            self.output.render_inline_script(content);
            flushed.inline += 1;
        }

        debug!(
            "flush";
            "{} bundle(s), {} inline snippet(s) into {}",
            flushed.bundles.len(),
            flushed.inline,
            output_path.display()
        );
        flushed
    }

    fn output(&self, kind: OutputKind) -> String {
        self.output.output(kind)
    }
}
