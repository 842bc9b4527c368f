use std::fs;
use std::path::{Path, PathBuf};

/// Creates the training corpus directory when missing.
pub fn ensure_corpus_dir(corpus_dir: &Path) -> std::io::Result<PathBuf> {
    ensure_dir(corpus_dir)?;
    Ok(corpus_dir.to_path_buf())
}

/// Creates the parent directory of an output file when missing.
pub fn ensure_parent_dir(file: &Path) -> std::io::Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
