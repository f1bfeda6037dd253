use std::sync::Arc;

use jobsub_core::backend::{BackendKind, BackendStrategy, QueueCheck};
use jobsub_core::config::{AppConfig, BackendSelector};
use jobsub_core::context::ClusterContext;
use jobsub_core::function::FunctionRegistry;
use jobsub_core::submit::{ProcessRunner, RetryStrategy};

use crate::backend::{LocalBackendStrategy, SlurmBackendStrategy, TorqueBackendStrategy};
use crate::functions::builtin_registry;
use crate::queue::{detect_backend, CommandQueueCheck};
use crate::retry::FixedDelayRetry;

/// Resolve `auto` once, by looking for scheduler front-ends on `PATH`.
pub fn resolve_backend(selector: BackendSelector) -> BackendKind {
    selector.fixed().unwrap_or_else(|| detect_backend(None))
}

pub fn build_retry(cfg: &AppConfig) -> Arc<dyn RetryStrategy> {
    Arc::new(FixedDelayRetry::from_config(&cfg.submit))
}

pub fn build_backend(kind: BackendKind, cfg: &AppConfig) -> Arc<dyn BackendStrategy> {
    match kind {
        BackendKind::Slurm => Arc::new(SlurmBackendStrategy::new(
            Arc::new(ProcessRunner),
            build_retry(cfg),
        )),
        BackendKind::Torque => Arc::new(TorqueBackendStrategy::new(
            Arc::new(ProcessRunner),
            build_retry(cfg),
        )),
        BackendKind::Local => Arc::new(LocalBackendStrategy::new(cfg.local.threads)),
    }
}

pub fn build_queue_check(kind: BackendKind) -> Arc<dyn QueueCheck> {
    Arc::new(CommandQueueCheck::new(kind))
}

/// Builtin functions, run through the configured runner binary if any.
pub fn build_registry(cfg: &AppConfig) -> FunctionRegistry {
    let registry = builtin_registry();
    match &cfg.function.runner {
        Some(runner) => registry.with_runner(runner),
        None => registry,
    }
}

pub fn build_context(cfg: AppConfig) -> ClusterContext {
    let kind = resolve_backend(cfg.backend);
    tracing::debug!(backend = %kind, selector = ?cfg.backend, "building context");
    let backend = build_backend(kind, &cfg);
    let queue = build_queue_check(kind);
    let registry = Arc::new(build_registry(&cfg));
    ClusterContext::new(cfg, backend, queue, registry)
}
