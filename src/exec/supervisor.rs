// src/exec/supervisor.rs

//! Pluggable process supervisor abstraction.
//!
//! The orchestrator talks to a `ProcessSupervisor` instead of spawning
//! processes itself. Production code uses [`super::TokioSupervisor`]; tests
//! provide a fake that scripts outcomes and artifacts without running fgtest.

use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::Result;
use crate::exec::env::EnvironmentContract;

/// The five positional arguments of fgtest, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub target_path: PathBuf,
    /// Passed through verbatim; fgtest owns its interpretation.
    pub seed: String,
    pub branch_meta_path: PathBuf,
    pub traces_path: PathBuf,
    pub rewards_path: PathBuf,
}

impl CommandLine {
    pub fn to_args(&self) -> Vec<OsString> {
        vec![
            self.target_path.clone().into_os_string(),
            OsString::from(&self.seed),
            self.branch_meta_path.clone().into_os_string(),
            self.traces_path.clone().into_os_string(),
            self.rewards_path.clone().into_os_string(),
        ]
    }
}

/// Everything needed to run fgtest once for one task.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub executable: PathBuf,
    pub command_line: CommandLine,
    pub environment: EnvironmentContract,
    /// The task's result directory.
    pub working_dir: PathBuf,
    /// Combined stdout/stderr plus header and trailer lines.
    pub log_path: PathBuf,
    pub timeout: Duration,
}

impl Invocation {
    /// Shell-like rendering used in logs.
    pub fn display_command(&self) -> String {
        std::iter::once(self.executable.clone().into_os_string())
            .chain(self.command_line.to_args())
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a supervised run ended. Each is reported once; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The process exited; `-1` when it was ended by a signal.
    Exited(i32),
    /// The wall-clock bound elapsed and the process was killed.
    TimedOut,
    /// The process could not be started or waited on.
    LaunchFailed(String),
}

/// Trait abstracting how fgtest is executed.
///
/// An `Err` is reserved for failures of the supervisor itself (e.g. the
/// execution log cannot be created); the orchestrator records those as
/// execution errors, the same as `LaunchFailed`.
pub trait ProcessSupervisor: Send + Sync {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<Outcome>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskOptions;
    use crate::exec::env::build_environment;

    #[test]
    fn arguments_keep_fixed_order() {
        let cl = CommandLine {
            target_path: PathBuf::from("/bin/dummy"),
            seed: "0x0402".to_string(),
            branch_meta_path: PathBuf::from("/up/branch_meta.json"),
            traces_path: PathBuf::from("/up/traces.json"),
            rewards_path: PathBuf::from("/res/rewards.json"),
        };
        let inv = Invocation {
            executable: PathBuf::from("/opt/fgtest"),
            command_line: cl,
            environment: build_environment(&TaskOptions::default()),
            working_dir: PathBuf::from("/res"),
            log_path: PathBuf::from("/res/execution.log"),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(
            inv.display_command(),
            "/opt/fgtest /bin/dummy 0x0402 /up/branch_meta.json /up/traces.json /res/rewards.json"
        );
    }
}
