//! Shared helpers.

pub mod hash;
pub mod html;
pub mod path;
