use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::watch;

use crate::error::SubmitError;
use crate::function::FunctionOutcome;

/// Result of one local job.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalOutcome {
    /// `None` when the script was killed by a signal.
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// Deserialized outcome when the job ran a function wrapper.
    pub function: Option<FunctionOutcome>,
}

impl LocalOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn runtime(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

pub(crate) type Slot = Option<Result<LocalOutcome, String>>;

/// Future-like handle on a job queued in the local pool.
#[derive(Clone)]
pub struct LocalHandle {
    id: u64,
    name: Arc<str>,
    rx: watch::Receiver<Slot>,
}

impl LocalHandle {
    pub(crate) fn new(id: u64, name: &str, rx: watch::Receiver<Slot>) -> Self {
        Self {
            id,
            name: Arc::from(name),
            rx,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_done(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Block until the job has finished, successfully or not.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(Option::is_some).await;
    }

    /// Wait, then return the job's outcome.
    pub async fn get(&self) -> Result<LocalOutcome, SubmitError> {
        let mut rx = self.rx.clone();
        let slot = match rx.wait_for(Option::is_some).await {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        match slot {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(reason)) => Err(SubmitError::LocalExecution {
                name: self.name.to_string(),
                reason,
            }),
            None => Err(SubmitError::LocalExecution {
                name: self.name.to_string(),
                reason: "worker stopped before the job finished".to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for LocalHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("done", &self.is_done())
            .finish()
    }
}
