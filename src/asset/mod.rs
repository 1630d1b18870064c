//! Asset registration, bundling and tag rendering.
//!
//! ```text
//! reference ─► resolve ─► registry ─► (flush) compress ─► minify
//!                                             │
//!                                             └─► output (html tags)
//! ```

mod compress;
mod error;
mod kind;
mod minify;
mod output;
mod registry;
mod resolve;

// Types
pub use error::AssetError;
pub use kind::{AssetType, OutputKind};
pub use output::{Attribute, Attributes, OutputBuilder};
pub use registry::{AssetRegistry, Registration};
pub use resolve::{AssetLocation, PathResolver};

// Compression
pub use compress::{
    BundleReport, BundleStatus, COMPRESSED_DIR, CachingCompressor, FlushReport, artifact_name,
    cache_key, default_uri_prefix,
};

// Minification
pub use minify::{
    CssMinifier, ImportExtensions, JsMinifier, MAX_IMPORT_SIZE, Minifier, Minifiers,
    default_import_extensions, minify_css, minify_js, write_artifact,
};

pub(crate) use error::report;
