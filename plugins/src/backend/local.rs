use async_trait::async_trait;

use jobsub_core::api as core_api;
use jobsub_core::error::SubmitError;
use jobsub_core::pool::PoolCell;

/// Runs submission scripts in this process's worker pool.
#[derive(Debug, Default)]
pub struct LocalBackendStrategy {
    pool: PoolCell,
}

impl LocalBackendStrategy {
    /// `threads` sizes the pool when a submission does not ask for a size itself.
    pub fn new(threads: Option<usize>) -> Self {
        Self {
            pool: PoolCell::new(threads),
        }
    }

    pub fn pool(&self) -> &PoolCell {
        &self.pool
    }
}

#[async_trait]
impl core_api::BackendStrategy for LocalBackendStrategy {
    fn kind(&self) -> core_api::BackendKind {
        core_api::BackendKind::Local
    }

    async fn submit(
        &self,
        request: core_api::SubmitRequest,
    ) -> Result<core_api::JobHandle, SubmitError> {
        if !request.dependencies.is_empty() {
            tracing::warn!(
                job = %request.name,
                dependencies = ?request.dependencies,
                "local pool has no dependency support, ignoring dependencies"
            );
        }
        let pool = self.pool.get_or_init(request.threads);
        let handle = pool.enqueue(
            &request.name,
            request.script,
            request.stdout,
            request.stderr,
            request.function_output,
        );
        Ok(core_api::JobHandle::Local(handle))
    }
}
