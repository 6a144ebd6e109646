// src/engine/dispatch.rs

//! Worker dispatch abstraction.
//!
//! Submission hands each orchestration to a `WorkerDispatch` and returns
//! immediately. The state machine never sees which implementation runs it.
//!
//! - [`SpawnPerTask`] is the default: one Tokio task per submission, no
//!   pool, no queue, no cap. Many simultaneous submissions mean as many
//!   simultaneous fgtest processes; this is a known scaling risk.
//! - [`BoundedDispatch`] caps concurrent orchestrations with a semaphore.
//!   Tasks waiting for a permit stay `pending`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::{FgtaskError, Result};
use crate::types::TaskId;

/// A boxed orchestration run.
pub type TaskJob = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Trait abstracting where an orchestration runs.
pub trait WorkerDispatch: Send + Sync {
    fn dispatch(&self, task_id: &TaskId, job: TaskJob) -> WorkerHandle;
}

/// Handle to a dispatched worker. Dropping it detaches the worker.
#[derive(Debug)]
pub struct WorkerHandle {
    task_id: TaskId,
    inner: JoinHandle<()>,
}

impl WorkerHandle {
    /// Wait for the worker to finish.
    pub async fn join(self) -> Result<()> {
        self.inner.await.map_err(|e| {
            FgtaskError::Other(anyhow::anyhow!(
                "worker for task {} did not finish cleanly: {e}",
                self.task_id
            ))
        })
    }
}

/// One dedicated Tokio task per submission.
#[derive(Debug, Clone, Default)]
pub struct SpawnPerTask;

impl WorkerDispatch for SpawnPerTask {
    fn dispatch(&self, task_id: &TaskId, job: TaskJob) -> WorkerHandle {
        debug!(task_id = %task_id, "spawning dedicated worker");
        WorkerHandle {
            task_id: task_id.clone(),
            inner: tokio::spawn(job),
        }
    }
}

/// At most `limit` orchestrations run at once.
#[derive(Debug, Clone)]
pub struct BoundedDispatch {
    permits: Arc<Semaphore>,
}

impl BoundedDispatch {
    pub fn new(limit: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.max(1))),
        }
    }
}

impl WorkerDispatch for BoundedDispatch {
    fn dispatch(&self, task_id: &TaskId, job: TaskJob) -> WorkerHandle {
        let permits = Arc::clone(&self.permits);
        let id = task_id.clone();
        let inner = tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!(task_id = %id, "worker pool closed; task left pending");
                    return;
                }
            };
            debug!(task_id = %id, "worker permit acquired");
            job.await;
        });

        WorkerHandle {
            task_id: task_id.clone(),
            inner,
        }
    }
}

/// Pick the dispatcher for an optional concurrency limit.
pub fn dispatch_for_limit(limit: Option<usize>) -> Arc<dyn WorkerDispatch> {
    match limit {
        Some(n) => Arc::new(BoundedDispatch::new(n)),
        None => Arc::new(SpawnPerTask),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn spawn_per_task_runs_job() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let handle = SpawnPerTask.dispatch(
            &TaskId::parse("t1").unwrap(),
            Box::pin(async move {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.join().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bounded_dispatch_caps_concurrency() {
        let dispatch = BoundedDispatch::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..6 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            let id = TaskId::parse(&format!("t{i}")).unwrap();
            handles.push(dispatch.dispatch(
                &id,
                Box::pin(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                }),
            ));
        }
        for h in handles {
            h.join().await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
