//! assetpack - css/js registration, bundling and tag rendering.
//!
//! Callers register file references, remote URLs and inline snippets during
//! a render; one flush per render concatenates and minifies each asset type
//! into `compressed/<hash>.<ext>`, reusing the artifact while the ordered
//! file list is unchanged, and renders the matching `<link>`/`<script>` tags.

pub mod logger;

pub mod asset;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod utils;

pub use asset::{AssetError, AssetType, Attributes, FlushReport, OutputKind, Registration};
pub use config::{AssetsConfig, ConfigError};
pub use pipeline::{AssetPipeline, Assets};
