use thiserror::Error;

use super::{CleanError, JobError, QueueError, SubmitError};

/// Top-level error surfaced by the `jobsub` binary.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("job error: {0}")]
    Job(#[from] JobError),
    #[error("queue unavailable: {0}")]
    Queue(#[from] QueueError),
    #[error("submission failed: {0}")]
    Submit(#[from] SubmitError),
    #[error("cleanup failed: {0}")]
    Clean(#[from] CleanError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}
