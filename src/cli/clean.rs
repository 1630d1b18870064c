//! `assetpack clean`: drop compressed artifacts.

use std::fs;

use anyhow::{Context, Result};

use crate::asset::COMPRESSED_DIR;
use crate::config::AssetsConfig;
use crate::log;

pub fn clean(config: &AssetsConfig) -> Result<()> {
    let output = match config.output_path() {
        Some(path) => path,
        None => config.build_assets().public_base_path(),
    };
    let dir = output.join(COMPRESSED_DIR);

    if !dir.is_dir() {
        log!("clean"; "nothing to clean in {}", output.display());
        return Ok(());
    }

    fs::remove_dir_all(&dir).with_context(|| format!("failed to remove {}", dir.display()))?;
    log!("clean"; "removed {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_compressed_dir() {
        let dir = TempDir::new().unwrap();
        let compressed = dir.path().join("public").join(COMPRESSED_DIR);
        fs::create_dir_all(&compressed).unwrap();
        fs::write(compressed.join("0123456789abcdef.css"), "a{}").unwrap();

        let config = AssetsConfig::parse("", dir.path()).unwrap();
        clean(&config).unwrap();
        assert!(!compressed.exists());
        assert!(dir.path().join("public").is_dir());

        // second run is a no-op
        clean(&config).unwrap();
    }
}
