use std::sync::Arc;

use async_trait::async_trait;

use jobsub_core::api as core_api;
use jobsub_core::error::SubmitError;
use jobsub_core::submit::{run_with_retry, CommandRunner, RetryStrategy};

const SUBMIT_PROGRAM: &str = "sbatch";

pub struct SlurmBackendStrategy {
    runner: Arc<dyn CommandRunner>,
    retry: Arc<dyn RetryStrategy>,
}

impl SlurmBackendStrategy {
    pub fn new(runner: Arc<dyn CommandRunner>, retry: Arc<dyn RetryStrategy>) -> Self {
        Self { runner, retry }
    }
}

/// `--dependency=afterok:<id>:<id>...`, or nothing without dependencies.
pub fn dependency_flag(dependencies: &[String]) -> Option<String> {
    if dependencies.is_empty() {
        return None;
    }
    Some(format!("--dependency=afterok:{}", dependencies.join(":")))
}

/// The id is the last word of `Submitted batch job <id>`.
pub fn parse_job_id(stdout: &str) -> Result<u64, SubmitError> {
    stdout
        .split_whitespace()
        .last()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| SubmitError::UnparseableId(stdout.to_string()))
}

#[async_trait]
impl core_api::BackendStrategy for SlurmBackendStrategy {
    fn kind(&self) -> core_api::BackendKind {
        core_api::BackendKind::Slurm
    }

    async fn submit(
        &self,
        request: core_api::SubmitRequest,
    ) -> Result<core_api::JobHandle, SubmitError> {
        let mut args: Vec<String> = dependency_flag(&request.dependencies).into_iter().collect();
        args.push(request.script.display().to_string());

        tracing::debug!(job = %request.name, ?args, "sbatch");
        let output = run_with_retry(
            self.runner.as_ref(),
            self.retry.as_ref(),
            SUBMIT_PROGRAM,
            &args,
            |_| None,
        )
        .await?;

        Ok(core_api::JobHandle::Scheduler {
            backend: core_api::BackendKind::Slurm,
            id: parse_job_id(&output.stdout)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::backend::tests::{request, ScriptedRunner};
    use crate::retry::FixedDelayRetry;
    use core_api::BackendStrategy;
    use pretty_assertions::assert_eq;

    #[test]
    fn dependencies_are_colon_joined() {
        let deps = vec!["3".to_string(), "7".to_string()];
        assert_eq!(
            dependency_flag(&deps).as_deref(),
            Some("--dependency=afterok:3:7")
        );
        assert_eq!(dependency_flag(&[]), None);
    }

    #[test]
    fn id_is_last_token() {
        assert_eq!(parse_job_id("Submitted batch job 4821").unwrap(), 4821);
        assert_eq!(parse_job_id("Submitted batch job 17\n").unwrap(), 17);
        let err = parse_job_id("sbatch: error: no partition").unwrap_err();
        assert!(matches!(err, SubmitError::UnparseableId(out) if out.contains("no partition")));
        assert!(parse_job_id("").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_retries_then_parses_id() {
        let runner = Arc::new(ScriptedRunner::failing_then(4, "Submitted batch job 4821\n"));
        let backend = SlurmBackendStrategy::new(runner.clone(), Arc::new(FixedDelayRetry::default()));
        let start = tokio::time::Instant::now();

        let handle = backend
            .submit(request("align", vec!["3".to_string(), "7".to_string()]))
            .await
            .unwrap();

        assert_eq!(handle.scheduler_id(), Some(4821));
        assert_eq!(start.elapsed(), Duration::from_secs(4));
        let calls = runner.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(
            calls[0],
            (
                "sbatch".to_string(),
                vec![
                    "--dependency=afterok:3:7".to_string(),
                    PathBuf::from("/jobs/align.cluster.sbatch").display().to_string()
                ]
            )
        );
    }

    #[tokio::test(start_paused = true)]
    async fn submit_fails_after_five_retries() {
        let runner = Arc::new(ScriptedRunner::failing_then(6, "Submitted batch job 1"));
        let backend = SlurmBackendStrategy::new(runner.clone(), Arc::new(FixedDelayRetry::default()));
        let start = tokio::time::Instant::now();

        let err = backend.submit(request("align", Vec::new())).await.unwrap_err();

        assert!(matches!(err, SubmitError::CommandFailed { .. }));
        assert!(err.is_transient());
        assert_eq!(runner.calls().len(), 6);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }
}
