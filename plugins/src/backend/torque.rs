use std::sync::Arc;

use async_trait::async_trait;

use jobsub_core::api as core_api;
use jobsub_core::error::SubmitError;
use jobsub_core::submit::{run_with_retry, CommandOutput, CommandRunner, RetryStrategy};

const SUBMIT_PROGRAM: &str = "qsub";
const REJECTION_PREFIX: &str = "qsub: submit error (";

pub struct TorqueBackendStrategy {
    runner: Arc<dyn CommandRunner>,
    retry: Arc<dyn RetryStrategy>,
}

impl TorqueBackendStrategy {
    pub fn new(runner: Arc<dyn CommandRunner>, retry: Arc<dyn RetryStrategy>) -> Self {
        Self { runner, retry }
    }
}

/// `-W depend=afterok:<id>,afterok:<id>...`, or nothing without dependencies.
pub fn dependency_args(dependencies: &[String]) -> Vec<String> {
    if dependencies.is_empty() {
        return Vec::new();
    }
    let depend = dependencies
        .iter()
        .map(|id| format!("afterok:{id}"))
        .collect::<Vec<_>>()
        .join(",");
    vec!["-W".to_string(), format!("depend={depend}")]
}

/// The id is the number before the first `.` of `<id>.<server>`.
pub fn parse_job_id(stdout: &str) -> Result<u64, SubmitError> {
    stdout
        .trim()
        .split('.')
        .next()
        .and_then(|head| head.parse().ok())
        .ok_or_else(|| SubmitError::UnparseableId(stdout.to_string()))
}

/// The server refused the job outright; submitting again will not help.
fn rejection(output: &CommandOutput) -> Option<SubmitError> {
    output
        .stderr
        .trim_start()
        .starts_with(REJECTION_PREFIX)
        .then(|| SubmitError::Rejected {
            program: SUBMIT_PROGRAM.to_string(),
            stderr: output.stderr.trim().to_string(),
        })
}

#[async_trait]
impl core_api::BackendStrategy for TorqueBackendStrategy {
    fn kind(&self) -> core_api::BackendKind {
        core_api::BackendKind::Torque
    }

    async fn submit(
        &self,
        request: core_api::SubmitRequest,
    ) -> Result<core_api::JobHandle, SubmitError> {
        let mut args = dependency_args(&request.dependencies);
        args.push(request.script.display().to_string());

        tracing::debug!(job = %request.name, ?args, "qsub");
        let output = run_with_retry(
            self.runner.as_ref(),
            self.retry.as_ref(),
            SUBMIT_PROGRAM,
            &args,
            rejection,
        )
        .await?;

        Ok(core_api::JobHandle::Scheduler {
            backend: core_api::BackendKind::Torque,
            id: parse_job_id(&output.stdout)?,
        })
    }
}
