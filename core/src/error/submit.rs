use thiserror::Error;

use super::JobError;

/// The configured backend cannot be used in this environment.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("{backend} backend is not usable, missing executables: {}", missing.join(", "))]
    Unavailable {
        backend: String,
        missing: Vec<String>,
    },
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("command `{program} {}` exited with code {code:?}\nstdout: {stdout}\nstderr: {stderr}", args.join(" "))]
    CommandFailed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("{program} rejected the submission: {stderr}")]
    Rejected { program: String, stderr: String },

    #[error("could not parse a job id from submit output {0:?}")]
    UnparseableId(String),

    #[error("dependency {0:?} has not been submitted yet")]
    UnresolvedDependency(String),

    #[error("local job {name} failed to run: {reason}")]
    LocalExecution { name: String, reason: String },

    #[error("job {name} was built for {job_backend}, not {backend}")]
    BackendMismatch {
        name: String,
        job_backend: String,
        backend: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cleanup refuses to run against an unusable backend; delete failures propagate.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("failed to remove {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl SubmitError {
    /// Whether another submission attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }
}
