//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path helpers (`normalize_path`, `clean_path`, `relative_to`)
//! - [`route`]: URL helpers (`strip_query`, `is_remote_url`, `is_stylesheet_relative`)

pub mod fs;
pub mod route;

pub use fs::{clean_path, normalize_path, relative_to, resolve_path, to_url_path};
pub use route::{is_remote_url, is_stylesheet_relative, split_path_suffix, strip_query};
