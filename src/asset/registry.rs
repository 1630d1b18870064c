//! Registered assets, accumulated until flush.

use std::path::Path;

use rustc_hash::FxHashSet;

use super::{AssetLocation, AssetType, PathResolver};

/// Outcome of a single registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Appended to the type's sequence.
    Added(AssetType),
    /// Identity key seen before; nothing happened.
    Duplicate,
    /// Not a css/js reference.
    NotAnAsset,
    /// An asset reference with no matching file.
    Unresolved(AssetType),
}

/// Ordered per-type asset sequences plus inline snippets.
///
/// The dedup set outlives flushes: a key registered once (even if it failed
/// to resolve) is ignored for the rest of the registry's life.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    css: Vec<AssetLocation>,
    js: Vec<AssetLocation>,
    inline_css: Vec<String>,
    inline_js: Vec<String>,
    seen: FxHashSet<String>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dedup key: the raw base path and reference, before resolution.
    pub fn identity_key(reference: &str, base: Option<&Path>) -> String {
        let base = base.map(|b| b.display().to_string()).unwrap_or_default();
        format!("{base}:{reference}")
    }

    /// Register one reference, resolving it against `base` or the public root.
    pub fn register(
        &mut self,
        resolver: &mut PathResolver,
        reference: &str,
        base: Option<&Path>,
    ) -> Registration {
        if !self.seen.insert(Self::identity_key(reference, base)) {
            return Registration::Duplicate;
        }

        let base = base.map_or_else(|| resolver.public_root(), Path::to_path_buf);
        match resolver.resolve(reference, &base) {
            None => Registration::NotAnAsset,
            Some((ty, None)) => Registration::Unresolved(ty),
            Some((ty, Some(location))) => {
                self.files_mut(ty).push(location);
                Registration::Added(ty)
            }
        }
    }

    /// Append an inline snippet. Never deduplicated.
    pub fn register_inline(&mut self, ty: AssetType, content: impl Into<String>) {
        match ty {
            AssetType::Css => self.inline_css.push(content.into()),
            AssetType::Js => self.inline_js.push(content.into()),
        }
    }

    /// Registered locations of one type, in registration order.
    pub fn files(&self, ty: AssetType) -> &[AssetLocation] {
        match ty {
            AssetType::Css => &self.css,
            AssetType::Js => &self.js,
        }
    }

    /// Inline snippets of one type, in registration order.
    pub fn inline(&self, ty: AssetType) -> &[String] {
        match ty {
            AssetType::Css => &self.inline_css,
            AssetType::Js => &self.inline_js,
        }
    }

    pub fn is_empty(&self) -> bool {
        AssetType::ALL
            .iter()
            .all(|&ty| self.files(ty).is_empty() && self.inline(ty).is_empty())
    }

    fn files_mut(&mut self, ty: AssetType) -> &mut Vec<AssetLocation> {
        match ty {
            AssetType::Css => &mut self.css,
            AssetType::Js => &mut self.js,
        }
    }
}
