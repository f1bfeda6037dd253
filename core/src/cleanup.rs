use std::path::{Path, PathBuf};

use crate::backend::BackendKind;

/// Remove every file directly in `dir` generated for `backend`.
pub fn clean(dir: &Path, backend: BackendKind) -> std::io::Result<Vec<PathBuf>> {
    clean_suffixes(dir, &backend.naming_suffixes())
}

/// Remove regular files directly in `dir` whose name ends with one of `suffixes`.
///
/// Symlinks to regular files count and only the link is removed; dangling links are skipped.
///
/// Returns the removed paths sorted; nothing to delete is not an error.
pub fn clean_suffixes(dir: &Path, suffixes: &[&str]) -> std::io::Result<Vec<PathBuf>> {
    let mut matched = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_file = match std::fs::metadata(entry.path()) {
            Ok(meta) => meta.is_file(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e),
        };
        if !is_file {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if suffixes.iter().any(|suffix| name.ends_with(suffix)) {
            matched.push(entry.path());
        }
    }
    matched.sort();

    if matched.is_empty() {
        tracing::debug!(dir = %dir.display(), "no files to delete");
        return Ok(matched);
    }
    for path in &matched {
        std::fs::remove_file(path)?;
        tracing::debug!(path = %path.display(), "removed");
    }
    Ok(matched)
}
