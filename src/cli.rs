// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `fgtask`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fgtask",
    version,
    about = "Run fgtest analysis tasks and track their status on disk.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the service config file (TOML).
    ///
    /// If omitted, `Fgtask.toml` in the current working directory is used
    /// when present, otherwise built-in defaults apply.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FGTASK_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Submit a task, wait for it to finish and print the final status.
    Run(RunArgs),

    /// Print the status record of a task.
    Status {
        /// Task identifier returned at submission.
        task_id: String,
    },

    /// Print the rewards document produced by a completed task.
    Result {
        /// Task identifier returned at submission.
        task_id: String,
    },

    /// Load and validate the config, print effective settings, run nothing.
    Check,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Program to analyse (must be listed in `[submit].programs`).
    #[arg(long)]
    pub program: String,

    /// Traces JSON file.
    #[arg(long, value_name = "FILE")]
    pub traces: PathBuf,

    /// Seed string, passed verbatim to fgtest.
    #[arg(long)]
    pub seed: Option<String>,

    /// Branch metadata JSON file; the default index under `bin_dir` is used
    /// when omitted.
    #[arg(long, value_name = "FILE")]
    pub branch_meta: Option<PathBuf>,

    /// Task options as a JSON object, e.g. `{"debug": true}`.
    #[arg(long, value_name = "JSON")]
    pub options: Option<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
