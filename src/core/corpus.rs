//! Corpus folder traversal

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::types::{KscgrError, Result};

/// Files under `folder` (recursively) with `extension`, sorted by path
pub fn corpus_files(folder: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(KscgrError::io(
            folder,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a valid folder"),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(folder).follow_links(true) {
        let entry = entry.map_err(|e| walk_error(folder, e))?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == extension) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!("Found {} .{} files in {}", files.len(), extension, folder.display());
    Ok(files)
}

fn walk_error(folder: &Path, err: walkdir::Error) -> KscgrError {
    let path = err.path().unwrap_or(folder).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("file system loop"));
    KscgrError::io(path, source)
}
