//! Backend selection and the capability set every backend implements.
//!
//! A backend renders a job's scripts, submits a written submission script and
//! names the files cleanup may remove. Concrete strategies live in
//! `jobsub-plugins`; adding a backend means adding one `BackendKind` variant and
//! one `BackendStrategy` implementation.

mod naming;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{QueueError, SubmitError};
use crate::pool::LocalHandle;
use crate::script::{self, RenderRequest, RenderedScripts};

pub use naming::{
    function_side_files, JobPaths, FUNCTION_INPUT_SUFFIX, FUNCTION_OUTPUT_SUFFIX,
    FUNCTION_SCRIPT_SUFFIX, LOCAL_SUBMISSION_SUFFIX, SLURM_EXECUTION_SUFFIX,
    SLURM_SUBMISSION_SUFFIX, STDERR_SUFFIX, STDOUT_SUFFIX, TORQUE_SUBMISSION_SUFFIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Separates the directive file from the executed script.
    Slurm,
    /// One combined directive file.
    Torque,
    /// In-process worker pool running plain shell scripts.
    Local,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Slurm => "slurm",
            Self::Torque => "torque",
            Self::Local => "local",
        }
    }

    pub fn submission_suffix(self) -> &'static str {
        match self {
            Self::Slurm => SLURM_SUBMISSION_SUFFIX,
            Self::Torque => TORQUE_SUBMISSION_SUFFIX,
            Self::Local => LOCAL_SUBMISSION_SUFFIX,
        }
    }

    pub fn execution_suffix(self) -> Option<&'static str> {
        match self {
            Self::Slurm => Some(SLURM_EXECUTION_SUFFIX),
            Self::Torque | Self::Local => None,
        }
    }

    /// Suffixes of every file generated for this backend.
    pub fn naming_suffixes(self) -> Vec<&'static str> {
        let mut suffixes = vec![STDERR_SUFFIX, STDOUT_SUFFIX, self.submission_suffix()];
        suffixes.extend(self.execution_suffix());
        suffixes
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A written submission script ready to hand to a backend.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub name: String,
    pub script: PathBuf,
    /// Resolved dependency identifiers.
    pub dependencies: Vec<String>,
    /// Local pool size; only used when the pool does not exist yet.
    pub threads: Option<usize>,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
    /// Where a function job leaves its serialized outcome.
    pub function_output: Option<PathBuf>,
}

/// Canonical identifier of a submitted job.
#[derive(Debug, Clone)]
pub enum JobHandle {
    Scheduler { backend: BackendKind, id: u64 },
    Local(LocalHandle),
}

impl JobHandle {
    pub fn backend(&self) -> BackendKind {
        match self {
            Self::Scheduler { backend, .. } => *backend,
            Self::Local(_) => BackendKind::Local,
        }
    }

    pub fn scheduler_id(&self) -> Option<u64> {
        match self {
            Self::Scheduler { id, .. } => Some(*id),
            Self::Local(_) => None,
        }
    }

    pub fn as_local(&self) -> Option<&LocalHandle> {
        match self {
            Self::Local(handle) => Some(handle),
            Self::Scheduler { .. } => None,
        }
    }

    /// Identifier used when another job depends on this one.
    pub fn id_string(&self) -> String {
        match self {
            Self::Scheduler { id, .. } => id.to_string(),
            Self::Local(handle) => handle.id().to_string(),
        }
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduler { backend, id } => write!(f, "{backend}:{id}"),
            Self::Local(handle) => write!(f, "local:{}", handle.id()),
        }
    }
}

#[async_trait]
pub trait BackendStrategy: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn name(&self) -> &str {
        self.kind().name()
    }

    fn render(&self, request: &RenderRequest<'_>) -> RenderedScripts {
        script::render(request, self.kind())
    }

    fn naming_suffixes(&self) -> Vec<&'static str> {
        self.kind().naming_suffixes()
    }

    async fn submit(&self, request: SubmitRequest) -> Result<JobHandle, SubmitError>;
}

/// Confirms the configured backend is usable before anything is submitted.
pub trait QueueCheck: Send + Sync {
    fn check(&self) -> Result<(), QueueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_suffixes_per_backend() {
        assert_eq!(
            BackendKind::Slurm.naming_suffixes(),
            vec![".cluster.err", ".cluster.out", ".cluster.sbatch", ".cluster.script"]
        );
        assert_eq!(
            BackendKind::Torque.naming_suffixes(),
            vec![".cluster.err", ".cluster.out", ".cluster.qsub"]
        );
        assert_eq!(
            BackendKind::Local.naming_suffixes(),
            vec![".cluster.err", ".cluster.out", ".cluster"]
        );
    }

    #[test]
    fn scheduler_handle_formats() {
        let handle = JobHandle::Scheduler {
            backend: BackendKind::Torque,
            id: 4821,
        };
        assert_eq!(handle.id_string(), "4821");
        assert_eq!(handle.scheduler_id(), Some(4821));
        assert_eq!(handle.to_string(), "torque:4821");
        assert!(handle.as_local().is_none());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Renders like a real backend and records submissions instead of running anything.
    pub(crate) struct RecordingBackend {
        kind: BackendKind,
        next_id: AtomicU64,
        pub(crate) submitted: Mutex<Vec<SubmitRequest>>,
    }

    impl RecordingBackend {
        pub(crate) fn new(kind: BackendKind) -> Self {
            Self {
                kind,
                next_id: AtomicU64::new(100),
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BackendStrategy for RecordingBackend {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        async fn submit(&self, request: SubmitRequest) -> Result<JobHandle, SubmitError> {
            self.submitted.lock().unwrap().push(request);
            Ok(JobHandle::Scheduler {
                backend: self.kind,
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
            })
        }
    }
}
