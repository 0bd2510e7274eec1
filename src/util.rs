// src/util.rs

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve a path relative to the location of `config.yaml`.
///
/// Absolute paths are returned unchanged.
///
/// Example:
/// config.yaml at `/project/config.yaml`
/// store.path = ".codepad/store.json"
/// → resolves to `/project/.codepad/store.json`
pub fn resolve_relative_to_config(config_path: &Path, rel: &str) -> PathBuf {
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() {
        return rel_path.to_path_buf();
    }

    match config_path.parent() {
        Some(base) => base.join(rel_path),
        None => rel_path.to_path_buf(),
    }
}

/// Read a UTF-8 file into a String with a clear error message.
///
/// This is mainly used for:
/// - config.yaml
/// - the JSON store file
/// - solution source files passed to `codepad run`
pub fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {:?}", path))
}

/// Ensure a directory exists (create it if missing).
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {:?}", path))
}
