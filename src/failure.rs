// src/failure.rs

//! Terminal failure taxonomy of a task.
//!
//! These are not errors returned to a caller: the orchestrator converts every
//! one of them into a `failed` status record, with the `Display` text as the
//! `error` message and [`TaskFailure::kind`] as the `error_kind` code.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskFailure {
    /// Output directory could not be prepared or configuration was unusable.
    #[error("Setup failed: {0}")]
    Setup(String),

    /// fgtest exceeded its wall-clock bound and was killed.
    #[error("Task execution timeout ({} seconds)", .0.as_secs())]
    Timeout(Duration),

    /// fgtest could not be started, or waiting on it failed.
    #[error("Execution error: {0}")]
    Launch(String),

    #[error("fgtest exited with code {0}")]
    NonZeroExit(i32),

    #[error("Result file not generated")]
    MissingArtifact,

    #[error("Invalid JSON in result file: {0}")]
    MalformedArtifact(String),

    /// The rewards file exists but could not be read.
    #[error("Failed to read result file: {0}")]
    UnreadableArtifact(String),

    /// Anything that escaped the orchestration body, including panics.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl TaskFailure {
    /// Stable code persisted next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskFailure::Setup(_) => "setup_failure",
            TaskFailure::Timeout(_) => "timeout",
            TaskFailure::Launch(_) => "launch_failure",
            TaskFailure::NonZeroExit(_) => "non_zero_exit",
            TaskFailure::MissingArtifact => "missing_artifact",
            TaskFailure::MalformedArtifact(_) | TaskFailure::UnreadableArtifact(_) => {
                "malformed_artifact"
            }
            TaskFailure::Unexpected(_) => "unexpected",
        }
    }
}
