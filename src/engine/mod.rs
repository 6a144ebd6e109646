// src/engine/mod.rs

//! Task execution engine.
//!
//! - [`submit`] turns a request into a staged [`TaskSpec`] and a `pending`
//!   status record.
//! - [`orchestrator`] drives one task: `running`, environment, supervised
//!   fgtest run, outcome interpretation, terminal status write.
//! - [`dispatch`] decides on which worker an orchestration runs.
//! - [`service`] wires the pieces together for the CLI.

use std::path::PathBuf;

use crate::config::TaskOptions;
use crate::types::TaskId;

pub mod dispatch;
pub mod orchestrator;
pub mod service;
pub mod submit;

pub use dispatch::{BoundedDispatch, SpawnPerTask, TaskJob, WorkerDispatch, WorkerHandle};
pub use orchestrator::{Orchestrator, resolve_output_dir};
pub use service::{SubmitReceipt, TaskService};
pub use submit::{SubmitRequest, Submission, Submitter};

/// Rewards document fgtest writes on success.
pub const REWARDS_FILE: &str = "rewards.json";

/// Combined process output and invocation details.
pub const EXECUTION_LOG_FILE: &str = "execution.log";

/// Default tool output directory name inside the result directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// One fully staged unit of work. Immutable once handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub id: TaskId,
    pub target_path: PathBuf,
    pub seed: String,
    pub branch_meta_path: PathBuf,
    pub traces_path: PathBuf,
    /// `<results_dir>/<task_id>`; holds status, log and rewards.
    pub result_dir: PathBuf,
    pub options: TaskOptions,
}

impl TaskSpec {
    pub fn rewards_path(&self) -> PathBuf {
        self.result_dir.join(REWARDS_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.result_dir.join(EXECUTION_LOG_FILE)
    }
}
