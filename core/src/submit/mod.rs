//! Submission protocol: queue check, dependency resolution, backend call.

mod retry;
mod runner;

pub use retry::{run_with_retry, RetryStrategy};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};

use crate::backend::{BackendStrategy, JobHandle, QueueCheck, SubmitRequest};
use crate::error::SubmitError;
use crate::job::{Job, JobState};

#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitOptions {
    /// Local pool size, used only if the pool does not exist yet.
    pub threads: Option<usize>,
    /// Overwrite artifacts when the job has not been written yet.
    pub overwrite: bool,
}

/// Write (if needed) and submit `job`, recording the handle on it.
///
/// Submitting an already submitted job returns its existing handle.
pub async fn submit_job(
    job: &mut Job,
    backend: &dyn BackendStrategy,
    queue: &dyn QueueCheck,
    options: SubmitOptions,
) -> Result<JobHandle, SubmitError> {
    if let Some(handle) = job.handle() {
        tracing::warn!(job = %job.name(), %handle, "job already submitted");
        return Ok(handle.clone());
    }
    if job.backend() != backend.kind() {
        return Err(SubmitError::BackendMismatch {
            name: job.name().to_string(),
            job_backend: job.backend().to_string(),
            backend: backend.kind().to_string(),
        });
    }

    queue.check()?;

    if job.state() == JobState::Created {
        job.write(options.overwrite)?;
    }
    let dependencies = job.resolve_dependencies()?;
    let request = job.submit_request(dependencies, options.threads);

    let handle = backend.submit(request).await?;
    tracing::info!(job = %job.name(), %handle, "job submitted");
    job.mark_submitted(handle.clone());
    Ok(handle)
}

/// Submit an already written script without a `Job`.
pub async fn submit_script(
    backend: &dyn BackendStrategy,
    queue: &dyn QueueCheck,
    request: SubmitRequest,
) -> Result<JobHandle, SubmitError> {
    queue.check()?;
    if !request.script.is_file() {
        return Err(SubmitError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("submission script {} does not exist", request.script.display()),
        )));
    }
    let name = request.name.clone();
    let handle = backend.submit(request).await?;
    tracing::info!(job = %name, %handle, "script submitted");
    Ok(handle)
}
