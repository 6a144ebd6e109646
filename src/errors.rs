// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{TaskId, TaskStatus};

#[derive(Error, Debug)]
pub enum FgtaskError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Invalid task id: {0:?}")]
    InvalidTaskId(String),

    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("Corrupt status record {path:?}: {reason}")]
    CorruptStatus { path: PathBuf, reason: String },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FgtaskError>;
