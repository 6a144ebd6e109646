// src/engine/orchestrator.rs

//! Per-task state machine: `pending -> running -> {completed | failed}`.
//!
//! Every failure inside a run is converted into exactly one terminal status
//! write. The body runs in its own Tokio task so that an error or panic that
//! escapes it is still caught and recorded, and no task is left `running`.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{Instrument, Span, error, info, info_span, warn};

use crate::engine::{DEFAULT_OUTPUT_DIR, TaskSpec};
use crate::errors::Result;
use crate::exec::{CommandLine, Invocation, Outcome, ProcessSupervisor, build_environment};
use crate::failure::TaskFailure;
use crate::fs::FileSystem;
use crate::status::StatusStore;
use crate::types::TaskStatus;

pub struct Orchestrator {
    fs: Arc<dyn FileSystem>,
    store: StatusStore,
    supervisor: Arc<dyn ProcessSupervisor>,
    executable: PathBuf,
    timeout: Duration,
    span: Span,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("executable", &self.executable)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        supervisor: Arc<dyn ProcessSupervisor>,
        executable: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            store: StatusStore::new(Arc::clone(&fs)),
            fs,
            supervisor,
            executable: executable.into(),
            timeout,
            span: info_span!("orchestrator"),
        }
    }

    /// Parent span for all task spans created by this orchestrator.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Run one task to a terminal status. Never returns an error: the status
    /// record is the only result channel.
    pub async fn run(self: Arc<Self>, task: TaskSpec) {
        let span = info_span!(parent: &self.span, "task", task_id = %task.id);
        let result_dir = task.result_dir.clone();

        let this = Arc::clone(&self);
        let body = tokio::spawn(async move { this.drive(task).await }.instrument(span.clone()));

        let escaped = match body.await {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(join_err) if join_err.is_panic() => {
                format!("task worker panicked: {}", panic_message(join_err.into_panic()))
            }
            Err(join_err) => join_err.to_string(),
        };

        span.in_scope(|| {
            error!(error = %escaped, "orchestration aborted; recording failure");
            let failure = TaskFailure::Unexpected(escaped);
            if let Err(e) = self
                .store
                .write(&result_dir, TaskStatus::Failed, Some(&failure), None)
            {
                error!(error = %e, "could not record failure in status record");
            }
        });
    }

    async fn drive(&self, task: TaskSpec) -> Result<()> {
        self.store
            .write(&task.result_dir, TaskStatus::Running, None, None)?;
        info!(target_path = ?task.target_path, "task running");

        match self.execute(&task).await {
            Ok(result) => {
                self.store
                    .write(&task.result_dir, TaskStatus::Completed, None, Some(result))?;
                info!("task completed");
            }
            Err(failure) => {
                warn!(kind = failure.kind(), error = %failure, "task failed");
                self.store
                    .write(&task.result_dir, TaskStatus::Failed, Some(&failure), None)?;
            }
        }
        Ok(())
    }

    async fn execute(&self, task: &TaskSpec) -> std::result::Result<Value, TaskFailure> {
        let output_dir = self.prepare_output_dir(task)?;

        let mut options = task.options.clone();
        options.output_dir = Some(output_dir.to_string_lossy().into_owned());
        let environment = build_environment(&options);

        let invocation = Invocation {
            executable: self.executable.clone(),
            command_line: CommandLine {
                target_path: task.target_path.clone(),
                seed: task.seed.clone(),
                branch_meta_path: task.branch_meta_path.clone(),
                traces_path: task.traces_path.clone(),
                rewards_path: task.rewards_path(),
            },
            environment,
            working_dir: task.result_dir.clone(),
            log_path: task.log_path(),
            timeout: self.timeout,
        };

        let outcome = self
            .supervisor
            .run(&invocation)
            .await
            .map_err(|e| TaskFailure::Launch(e.to_string()))?;

        self.interpret(outcome, &task.rewards_path())
    }

    fn prepare_output_dir(&self, task: &TaskSpec) -> std::result::Result<PathBuf, TaskFailure> {
        if task.options.output_dir.as_deref().is_some_and(str::is_empty) {
            return Err(TaskFailure::Setup("output_dir must not be empty".to_string()));
        }

        let dir = resolve_output_dir(&task.result_dir, task.options.output_dir.as_deref());
        self.fs.create_dir_all(&dir).map_err(|e| {
            TaskFailure::Setup(format!("creating output directory {:?}: {e:#}", dir))
        })?;
        Ok(dir)
    }

    fn interpret(
        &self,
        outcome: Outcome,
        rewards_path: &Path,
    ) -> std::result::Result<Value, TaskFailure> {
        match outcome {
            Outcome::TimedOut => Err(TaskFailure::Timeout(self.timeout)),
            Outcome::LaunchFailed(msg) => Err(TaskFailure::Launch(msg)),
            Outcome::Exited(code) if code != 0 => Err(TaskFailure::NonZeroExit(code)),
            Outcome::Exited(_) => self.load_rewards(rewards_path),
        }
    }

    fn load_rewards(&self, path: &Path) -> std::result::Result<Value, TaskFailure> {
        if !self.fs.is_file(path) {
            return Err(TaskFailure::MissingArtifact);
        }

        let contents = self
            .fs
            .read_to_string(path)
            .map_err(|e| TaskFailure::UnreadableArtifact(format!("{e:#}")))?;

        serde_json::from_str(&contents).map_err(|e| TaskFailure::MalformedArtifact(e.to_string()))
    }
}

/// Effective tool output directory.
///
/// Absent means `<result_dir>/output`; a relative value is taken relative to
/// `result_dir`; an absolute value is used as is.
pub fn resolve_output_dir(result_dir: &Path, requested: Option<&str>) -> PathBuf {
    match requested {
        None => result_dir.join(DEFAULT_OUTPUT_DIR),
        Some(dir) => {
            let dir = Path::new(dir);
            if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                result_dir.join(dir)
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
