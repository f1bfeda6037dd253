//! Generated script text bound to an absolute file path.

use std::path::{Path, PathBuf};

/// What this process knows about the artifact's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    NotWritten,
    /// Written by this process.
    Written,
    /// A write was requested but the file was already there and overwrite was off.
    /// The on-disk content may be stale relative to `text`.
    PreExisting,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    text: String,
    path: PathBuf,
    state: WriteState,
}

impl Artifact {
    pub fn new(path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            path: absolutize(path.as_ref()),
            state: WriteState::NotWritten,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> WriteState {
        self.state
    }

    pub fn written(&self) -> bool {
        self.state == WriteState::Written
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Persist the text. An existing file is left untouched unless `overwrite`.
    ///
    /// Returns the path when the file was written, `None` when it was skipped.
    pub fn write(&mut self, overwrite: bool) -> std::io::Result<Option<PathBuf>> {
        if !overwrite && self.path.exists() {
            tracing::debug!(path = %self.path.display(), "artifact exists, not overwriting");
            if self.state != WriteState::Written {
                self.state = WriteState::PreExisting;
            }
            return Ok(None);
        }

        let mut content = String::with_capacity(self.text.len() + 1);
        content.push_str(&self.text);
        content.push('\n');
        std::fs::write(&self.path, content)?;
        self.state = WriteState::Written;
        Ok(Some(self.path.clone()))
    }

    /// Remove the file if this process wrote it.
    pub fn remove(&mut self) -> std::io::Result<bool> {
        if self.state != WriteState::Written || !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        self.state = WriteState::NotWritten;
        Ok(true)
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Script<{}(exists: {}; state: {:?})>::",
            self.path.display(),
            self.exists(),
            self.state
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.text)
    }
}

pub(crate) fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_become_absolute() {
        let artifact = Artifact::new("job.cluster", "echo hi");
        assert!(artifact.path().is_absolute());
        assert!(artifact.path().ends_with("job.cluster"));
        assert_eq!(artifact.state(), WriteState::NotWritten);
    }

    #[test]
    fn write_appends_newline_and_marks_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = Artifact::new(dir.path().join("a.cluster"), "echo hi");

        let written = artifact.write(false).unwrap();
        assert_eq!(written.as_deref(), Some(artifact.path()));
        assert!(artifact.written());
        assert_eq!(std::fs::read_to_string(artifact.path()).unwrap(), "echo hi\n");
    }

    #[test]
    fn existing_file_is_kept_stale_without_overwrite() {
        // Skipping a file that already exists is the sanctioned behavior, even
        // when its content differs from what would be rendered now.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.cluster");
        std::fs::write(&path, "old\n").unwrap();

        let mut artifact = Artifact::new(&path, "new");
        assert_eq!(artifact.write(false).unwrap(), None);
        assert_eq!(artifact.state(), WriteState::PreExisting);
        assert!(!artifact.written());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\n");

        assert!(artifact.write(true).unwrap().is_some());
        assert_eq!(artifact.state(), WriteState::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn write_into_missing_directory_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = Artifact::new(dir.path().join("missing/a.cluster"), "x");
        let err = artifact.write(false).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert_eq!(artifact.state(), WriteState::NotWritten);
    }

    #[test]
    fn remove_only_touches_files_we_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.cluster");
        std::fs::write(&path, "theirs\n").unwrap();

        let mut artifact = Artifact::new(&path, "ours");
        artifact.write(false).unwrap();
        assert!(!artifact.remove().unwrap());
        assert!(path.exists());

        artifact.write(true).unwrap();
        assert!(artifact.remove().unwrap());
        assert!(!path.exists());
    }
}
