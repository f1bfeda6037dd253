use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{BackendKind, BackendStrategy, JobHandle, QueueCheck};
use crate::cleanup;
use crate::config::AppConfig;
use crate::error::{CleanError, JobError, SubmitError};
use crate::function::FunctionRegistry;
use crate::job::{Job, JobSpec};
use crate::submit::{self, SubmitOptions};

/// Everything a caller needs to create, write, submit and clean jobs on one backend.
#[derive(Clone)]
pub struct ClusterContext {
    cfg: AppConfig,
    backend: Arc<dyn BackendStrategy>,
    queue: Arc<dyn QueueCheck>,
    registry: Arc<FunctionRegistry>,
}

impl ClusterContext {
    pub fn new(
        cfg: AppConfig,
        backend: Arc<dyn BackendStrategy>,
        queue: Arc<dyn QueueCheck>,
        registry: Arc<FunctionRegistry>,
    ) -> Self {
        Self {
            cfg,
            backend,
            queue,
            registry,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    /// Same backend, queue check and functions under a different config.
    pub fn with_config(&self, cfg: AppConfig) -> Self {
        Self {
            cfg,
            backend: self.backend.clone(),
            queue: self.queue.clone(),
            registry: self.registry.clone(),
        }
    }

    pub fn backend(&self) -> &dyn BackendStrategy {
        self.backend.as_ref()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Build a job, filling unset directories from `[jobs]` config.
    pub fn create_job(&self, mut spec: JobSpec) -> Result<Job, JobError> {
        let jobs = &self.cfg.jobs;
        if spec.dir.is_none() {
            spec.dir = jobs.dir.as_ref().map(PathBuf::from);
        }
        if spec.out_dir.is_none() {
            spec.out_dir = jobs.out_dir.as_ref().map(PathBuf::from);
        }
        if spec.script_dir.is_none() {
            spec.script_dir = jobs.script_dir.as_ref().map(PathBuf::from);
        }
        Job::new(spec, self.backend.as_ref(), &self.registry)
    }

    /// Write a job's artifacts; `overwrite` defaults to `jobs.overwrite`.
    pub fn write_job(&self, job: &mut Job, overwrite: Option<bool>) -> Result<Vec<PathBuf>, JobError> {
        job.write(overwrite.unwrap_or(self.cfg.jobs.overwrite))
    }

    pub async fn submit_job(&self, job: &mut Job) -> Result<JobHandle, SubmitError> {
        let options = SubmitOptions {
            threads: self.cfg.local.threads,
            overwrite: self.cfg.jobs.overwrite,
        };
        submit::submit_job(job, self.backend.as_ref(), self.queue.as_ref(), options).await
    }

    /// Remove this backend's generated files from `dir` after checking the queue.
    pub fn clean(&self, dir: &Path) -> Result<Vec<PathBuf>, CleanError> {
        self.queue.check()?;
        cleanup::clean(dir, self.backend.kind()).map_err(|source| CleanError::Io {
            path: dir.display().to_string(),
            source,
        })
    }
}

impl std::fmt::Debug for ClusterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterContext")
            .field("backend", &self.backend.kind())
            .field("registry", &self.registry)
            .finish()
    }
}
