// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running fgtest, using
//! `tokio::process::Command`, and classifying how the run ended.
//!
//! - [`env`] builds the `TAINT_OPTIONS` directive string from task options.
//! - [`supervisor`] defines the `ProcessSupervisor` trait plus the
//!   `Invocation` it consumes and the `Outcome` it reports.
//! - [`process`] is the production supervisor (`TokioSupervisor`).
//! - [`log`] writes the per-task `execution.log`.

pub mod env;
pub mod log;
pub mod process;
pub mod supervisor;

pub use env::{EnvironmentContract, TAINT_OPTIONS_VAR, build_environment};
pub use process::TokioSupervisor;
pub use supervisor::{CommandLine, Invocation, Outcome, ProcessSupervisor};
