//! Hashing utilities using FxHash.
//!
//! Uses `rustc_hash::FxHasher` for fast, deterministic hashing. The digest
//! is not cryptographic; it only names cache artifacts, where a collision
//! costs a stale bundle and nothing more.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let h = hash::compute("some content"); // -> u64
//! let hex = hash::hex_digest("some content"); // -> "a1b2c3d4e5f60718"
//! ```

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

/// Compute hash and return it as 16 lowercase hex chars.
#[inline]
pub fn hex_digest<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    format!("{:016x}", compute(data))
}
