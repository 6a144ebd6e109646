// src/engine/service.rs

//! Service facade: submission, dispatch and status queries in one place.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{Span, debug, warn};

use crate::config::{ConfigFile, resolve_fgtest_path};
use crate::engine::dispatch::{WorkerDispatch, WorkerHandle, dispatch_for_limit};
use crate::engine::orchestrator::Orchestrator;
use crate::engine::submit::{SubmitRequest, Submitter};
use crate::engine::REWARDS_FILE;
use crate::errors::{FgtaskError, Result};
use crate::exec::ProcessSupervisor;
use crate::fs::FileSystem;
use crate::status::{StatusRecord, StatusStore};
use crate::types::{BranchMetaSource, TaskId, TaskStatus};

/// Returned to the submitter as soon as the task is staged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub seed: String,
    pub program: String,
    pub branch_meta_source: BranchMetaSource,
    pub message: String,
}

pub struct TaskService {
    config: Arc<ConfigFile>,
    fs: Arc<dyn FileSystem>,
    store: StatusStore,
    submitter: Submitter,
    orchestrator: Arc<Orchestrator>,
    dispatch: Arc<dyn WorkerDispatch>,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService")
            .field("config", &self.config)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl TaskService {
    /// Build a service from config. The dispatcher follows
    /// `[service].max_concurrent_tasks`.
    ///
    /// A relative `fgtest_path` is resolved against the current directory.
    pub fn new(
        mut config: ConfigFile,
        fs: Arc<dyn FileSystem>,
        supervisor: Arc<dyn ProcessSupervisor>,
        span: Span,
    ) -> Self {
        if config.service.fgtest_path.is_relative() {
            match std::env::current_dir() {
                Ok(cwd) => resolve_fgtest_path(&mut config, &cwd),
                Err(e) => warn!(error = %e, "cannot resolve relative fgtest path"),
            }
        }
        let config = Arc::new(config);
        let orchestrator = Orchestrator::new(
            Arc::clone(&fs),
            supervisor,
            config.service.fgtest_path.clone(),
            config.timeout(),
        )
        .with_span(span);

        Self {
            dispatch: dispatch_for_limit(config.concurrency_limit()),
            submitter: Submitter::new(Arc::clone(&config), Arc::clone(&fs)),
            store: StatusStore::new(Arc::clone(&fs)),
            orchestrator: Arc::new(orchestrator),
            fs,
            config,
        }
    }

    /// Replace the worker dispatcher.
    pub fn with_dispatch(mut self, dispatch: Arc<dyn WorkerDispatch>) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Stage a task and start it in the background.
    ///
    /// Returns once the `pending` record exists; the handle may be dropped
    /// to detach from the worker.
    pub fn submit(&self, request: SubmitRequest) -> Result<(SubmitReceipt, WorkerHandle)> {
        let submission = self.submitter.submit(request)?;
        let receipt = SubmitReceipt {
            task_id: submission.task.id.clone(),
            status: TaskStatus::Pending,
            seed: submission.task.seed.clone(),
            program: submission.program,
            branch_meta_source: submission.branch_meta_source,
            message: "Task submitted successfully".to_string(),
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        let task = submission.task;
        let handle = self
            .dispatch
            .dispatch(&receipt.task_id, Box::pin(orchestrator.run(task)));

        Ok((receipt, handle))
    }

    /// Current status record of a task.
    pub fn status(&self, task_id: &str) -> Result<StatusRecord> {
        let id = TaskId::parse(task_id)?;
        self.store.read(&self.result_dir(&id))
    }

    /// Location of the rewards document of a task, if it was produced.
    pub fn result_path(&self, task_id: &str) -> Result<PathBuf> {
        let id = TaskId::parse(task_id)?;
        let path = self.result_dir(&id).join(REWARDS_FILE);
        if self.fs.is_file(&path) {
            Ok(path)
        } else {
            Err(FgtaskError::TaskNotFound(id))
        }
    }

    /// Poll the status record until it reaches a terminal state.
    pub async fn wait_for_terminal(
        &self,
        task_id: &TaskId,
        poll_interval: Duration,
    ) -> Result<StatusRecord> {
        let dir = self.result_dir(task_id);
        loop {
            let record = self.store.read(&dir)?;
            if record.is_terminal() {
                return Ok(record);
            }
            debug!(task_id = %task_id, status = %record.status, "waiting for task");
            tokio::time::sleep(poll_interval).await;
        }
    }

    fn result_dir(&self, id: &TaskId) -> PathBuf {
        self.config.service.results_dir.join(id.as_str())
    }
}
