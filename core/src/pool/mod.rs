//! Bounded local worker pool.
//!
//! Work is started in strict submission order: a single dispatcher task takes
//! queued jobs one by one and waits for a semaphore permit before spawning
//! each of them. At most `size` jobs run at once.

mod handle;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::{mpsc, watch, Semaphore};

pub use handle::{LocalHandle, LocalOutcome};
use handle::Slot;

use crate::function::read_outcome;

type Work = Pin<Box<dyn Future<Output = ()> + Send>>;

pub struct LocalPool {
    size: usize,
    next_id: AtomicU64,
    queue: mpsc::UnboundedSender<Work>,
}

impl LocalPool {
    /// Must be called inside a tokio runtime; the dispatcher is spawned here.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let permits = Arc::new(Semaphore::new(size));
        let (queue, mut rx) = mpsc::unbounded_channel::<Work>();

        tokio::spawn(async move {
            while let Some(work) = rx.recv().await {
                let Ok(permit) = permits.clone().acquire_owned().await else {
                    break;
                };
                tokio::spawn(async move {
                    work.await;
                    drop(permit);
                });
            }
        });

        tracing::debug!(size, "local pool started");
        Self {
            size,
            next_id: AtomicU64::new(1),
            queue,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Queue arbitrary work; returns immediately.
    pub fn spawn<F>(&self, name: &str, work: F) -> LocalHandle
    where
        F: Future<Output = Result<LocalOutcome, String>> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = watch::channel::<Slot>(None);
        let job = name.to_string();
        let boxed: Work = Box::pin(async move {
            let result = work.await;
            if let Err(reason) = &result {
                tracing::warn!(job = %job, "local job failed: {reason}");
            }
            let _ = tx.send(Some(result));
        });
        if self.queue.send(boxed).is_err() {
            tracing::warn!(job = %name, "local pool dispatcher is gone");
        }
        LocalHandle::new(id, name, rx)
    }

    /// Queue `bash <script>` with stdout/stderr redirected to the given files.
    pub fn enqueue(
        &self,
        name: &str,
        script: PathBuf,
        stdout: PathBuf,
        stderr: PathBuf,
        function_output: Option<PathBuf>,
    ) -> LocalHandle {
        tracing::debug!(job = %name, script = %script.display(), "queueing local job");
        self.spawn(name, run_script(script, stdout, stderr, function_output))
    }
}

impl std::fmt::Debug for LocalPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPool").field("size", &self.size).finish()
    }
}

async fn run_script(
    script: PathBuf,
    stdout: PathBuf,
    stderr: PathBuf,
    function_output: Option<PathBuf>,
) -> Result<LocalOutcome, String> {
    let out = std::fs::File::create(&stdout)
        .map_err(|e| format!("cannot open {}: {e}", stdout.display()))?;
    let err = std::fs::File::create(&stderr)
        .map_err(|e| format!("cannot open {}: {e}", stderr.display()))?;
    if let Some(path) = &function_output {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed stale function outcome"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(format!("cannot clear {}: {e}", path.display())),
        }
    }

    let started_at = chrono::Local::now();
    let status = tokio::process::Command::new("bash")
        .arg(&script)
        .stdin(Stdio::null())
        .stdout(Stdio::from(out))
        .stderr(Stdio::from(err))
        .status()
        .await
        .map_err(|e| format!("failed to run bash {}: {e}", script.display()))?;
    let finished_at = chrono::Local::now();

    let function = match function_output {
        Some(path) => match read_outcome(&path) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(path = %path.display(), "no function outcome: {e}");
                None
            }
        },
        None => None,
    };

    Ok(LocalOutcome {
        exit_code: status.code(),
        started_at,
        finished_at,
        function,
    })
}

/// Owner of the lazily created pool.
///
/// The pool is built on first use and lives as long as its owner. Its size is
/// fixed by whichever request creates it; later size requests are ignored.
#[derive(Debug, Default)]
pub struct PoolCell {
    pool: OnceLock<LocalPool>,
    default_threads: Option<usize>,
}

impl PoolCell {
    pub fn new(default_threads: Option<usize>) -> Self {
        Self {
            pool: OnceLock::new(),
            default_threads,
        }
    }

    pub fn get(&self) -> Option<&LocalPool> {
        self.pool.get()
    }

    pub fn get_or_init(&self, threads: Option<usize>) -> &LocalPool {
        let wanted = threads
            .or(self.default_threads)
            .unwrap_or_else(num_cpus::get)
            .max(1);
        let pool = self.pool.get_or_init(|| LocalPool::new(wanted));
        if threads.is_some() && pool.size() != wanted {
            tracing::debug!(
                requested = wanted,
                size = pool.size(),
                "local pool already exists, keeping its size"
            );
        }
        pool
    }
}
