use thiserror::Error;

/// Construction errors. These are raised while building a job and are never retried.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("invalid job name: {0:?}")]
    InvalidName(String),

    #[error("job {0:?} has no command to run")]
    EmptyCommand(String),

    #[error("dependencies must be job numbers or jobs, got {0:?}")]
    InvalidDependency(String),

    #[error("{0:?} is not a registered callable function")]
    NotCallable(String),

    #[error("invalid function arguments for {function}: {reason}")]
    InvalidArgs { function: String, reason: String },

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}
