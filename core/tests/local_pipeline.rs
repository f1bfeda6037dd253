use std::sync::Arc;

use async_trait::async_trait;
use jobsub_core::api::{
    submit_job, BackendKind, BackendStrategy, FunctionRegistry, Job, JobHandle, JobSpec, PoolCell,
    QueueCheck, QueueError, SubmitError, SubmitOptions, SubmitRequest,
};
use jobsub_core::cleanup;

struct PoolBackend {
    pool: PoolCell,
}

#[async_trait]
impl BackendStrategy for PoolBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn submit(&self, request: SubmitRequest) -> Result<JobHandle, SubmitError> {
        let pool = self.pool.get_or_init(request.threads);
        Ok(JobHandle::Local(pool.enqueue(
            &request.name,
            request.script,
            request.stdout,
            request.stderr,
            request.function_output,
        )))
    }
}

struct Always;

impl QueueCheck for Always {
    fn check(&self) -> Result<(), QueueError> {
        Ok(())
    }
}

#[tokio::test]
async fn shell_job_runs_locally_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(PoolBackend {
        pool: PoolCell::new(Some(2)),
    });
    let registry = FunctionRegistry::new();

    let mut job = Job::new(
        JobSpec::shell("echo from-job; exit 3").name("e2e").dir(dir.path()),
        backend.as_ref(),
        &registry,
    )
    .unwrap();

    let handle = submit_job(&mut job, backend.as_ref(), &Always, SubmitOptions::default())
        .await
        .unwrap();
    let outcome = handle.as_local().unwrap().get().await.unwrap();
    assert_eq!(outcome.exit_code, Some(3));
    assert!(outcome.function.is_none());

    let stdout = std::fs::read_to_string(dir.path().join("e2e.cluster.out")).unwrap();
    assert!(stdout.contains("Running e2e"));
    assert!(stdout.contains("from-job"));
    assert!(stdout.contains("Done"));
    let stderr = std::fs::read_to_string(dir.path().join("e2e.cluster.err")).unwrap();
    assert!(stderr.contains("Exited with code: 3"));

    let removed = cleanup::clean(dir.path(), BackendKind::Local).unwrap();
    let names: Vec<String> = removed
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["e2e.cluster", "e2e.cluster.err", "e2e.cluster.out"]);
}
