use std::ffi::OsString;
use std::path::PathBuf;

use jobsub_core::backend::{BackendKind, QueueCheck};
use jobsub_core::error::QueueError;

/// Checks that a scheduler's front-end programs are on `PATH`.
#[derive(Debug, Clone)]
pub struct CommandQueueCheck {
    kind: BackendKind,
    search_path: Option<OsString>,
}

impl CommandQueueCheck {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            search_path: None,
        }
    }

    /// Look in `paths` instead of the process `PATH`.
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    pub fn required_programs(kind: BackendKind) -> &'static [&'static str] {
        match kind {
            BackendKind::Slurm => &["sbatch", "squeue"],
            BackendKind::Torque => &["qsub", "qstat"],
            BackendKind::Local => &[],
        }
    }
}

impl QueueCheck for CommandQueueCheck {
    fn check(&self) -> Result<(), QueueError> {
        let missing: Vec<String> = Self::required_programs(self.kind)
            .iter()
            .filter(|program| find_program(program, self.search_path.as_ref()).is_none())
            .map(|program| program.to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(QueueError::Unavailable {
            backend: self.kind.to_string(),
            missing,
        })
    }
}

/// First available scheduler: Slurm, then Torque, else the local pool.
pub fn detect_backend(search_path: Option<&OsString>) -> BackendKind {
    let detected = if find_program("sbatch", search_path).is_some() {
        BackendKind::Slurm
    } else if find_program("qsub", search_path).is_some() {
        BackendKind::Torque
    } else {
        BackendKind::Local
    };
    tracing::debug!(backend = %detected, "detected backend");
    detected
}

fn find_program(program: &str, search_path: Option<&OsString>) -> Option<PathBuf> {
    match search_path {
        Some(paths) => {
            let cwd = std::env::current_dir().ok()?;
            which::which_in(program, Some(paths), cwd).ok()
        }
        None => which::which(program).ok(),
    }
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use super::*;
    use pretty_assertions::assert_eq;

    fn fake_program(dir: &Path, name: &str) {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn local_is_always_available() {
        let dir = tempfile::tempdir().unwrap();
        let check = CommandQueueCheck::new(BackendKind::Local).with_search_path(dir.path());
        assert!(check.check().is_ok());
    }

    #[test]
    fn missing_programs_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        fake_program(dir.path(), "sbatch");

        let err = CommandQueueCheck::new(BackendKind::Slurm)
            .with_search_path(dir.path())
            .check()
            .unwrap_err();
        match &err {
            QueueError::Unavailable { backend, missing } => {
                assert_eq!(backend, "slurm");
                assert_eq!(missing, &vec!["squeue".to_string()]);
            }
        }
        assert!(err.to_string().contains("squeue"));

        fake_program(dir.path(), "squeue");
        assert!(CommandQueueCheck::new(BackendKind::Slurm)
            .with_search_path(dir.path())
            .check()
            .is_ok());
    }

    #[test]
    fn detection_prefers_slurm_then_torque() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OsString::from(dir.path());
        assert_eq!(detect_backend(Some(&paths)), BackendKind::Local);

        fake_program(dir.path(), "qsub");
        assert_eq!(detect_backend(Some(&paths)), BackendKind::Torque);

        fake_program(dir.path(), "sbatch");
        assert_eq!(detect_backend(Some(&paths)), BackendKind::Slurm);
    }
}
