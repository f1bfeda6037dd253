//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `jobsub_core::api` instead of reaching into internal modules.

pub use crate::artifact::{Artifact, WriteState};
pub use crate::backend::{
    BackendKind, BackendStrategy, JobHandle, JobPaths, QueueCheck, SubmitRequest,
};
pub use crate::cleanup::clean;
pub use crate::config::{load_default, load_file, AppConfig, BackendSelector, LoggingConfig};
pub use crate::context::ClusterContext;
pub use crate::error::{CleanError, CliError, JobError, QueueError, SubmitError};
pub use crate::function::{
    read_outcome, run_function, CallArgs, FunctionFailure, FunctionOutcome, FunctionRegistry,
    RemoteFunction,
};
pub use crate::job::{CommandSpec, Dependency, Job, JobSpec, JobState, ResourceRequest};
pub use crate::pool::{LocalHandle, LocalOutcome, LocalPool, PoolCell};
pub use crate::script::{render, RenderRequest, RenderedScripts};
pub use crate::submit::{
    run_with_retry, submit_job, submit_script, CommandOutput, CommandRunner, ProcessRunner,
    RetryStrategy, SubmitOptions,
};
