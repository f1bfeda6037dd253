use std::time::Duration;

use super::runner::{CommandOutput, CommandRunner};
use crate::error::SubmitError;

/// Decides whether and when a failed submission is attempted again.
pub trait RetryStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Attempts allowed after the first one.
    fn max_retries(&self) -> u32;

    /// Pause before retry number `retry` (1-based).
    fn delay(&self, retry: u32) -> Duration;

    /// Pause after `failures` consecutive failures, or `None` when exhausted.
    fn next_delay(&self, failures: u32) -> Option<Duration> {
        (failures <= self.max_retries()).then(|| self.delay(failures))
    }

    fn max_attempts(&self) -> u32 {
        self.max_retries().saturating_add(1)
    }
}

/// Run `program args`, retrying non-zero exits per `retry`.
///
/// A process that cannot be started is never retried. `classify` may turn a
/// failed output into a permanent error, which also stops the loop.
pub async fn run_with_retry<F>(
    runner: &dyn CommandRunner,
    retry: &dyn RetryStrategy,
    program: &str,
    args: &[String],
    classify: F,
) -> Result<CommandOutput, SubmitError>
where
    F: Fn(&CommandOutput) -> Option<SubmitError> + Send + Sync,
{
    let mut failures = 0u32;
    loop {
        let output = runner
            .run(program, args)
            .await
            .map_err(|source| SubmitError::Spawn {
                program: program.to_string(),
                source,
            })?;
        if output.success() {
            return Ok(output);
        }
        if let Some(permanent) = classify(&output) {
            return Err(permanent);
        }

        failures += 1;
        let Some(delay) = retry.next_delay(failures) else {
            return Err(SubmitError::CommandFailed {
                program: program.to_string(),
                args: args.to_vec(),
                code: output.code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        };
        tracing::warn!(
            program,
            code = ?output.code,
            attempt = failures,
            strategy = retry.name(),
            "submission failed, retrying in {}ms: {}",
            delay.as_millis(),
            output.stderr.trim()
        );
        tokio::time::sleep(delay).await;
    }
}
