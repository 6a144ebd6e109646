// src/exec/process.rs

//! Production process supervisor built on `tokio::process`.

use std::future::Future;
use std::pin::Pin;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::log::ExecutionLog;
use crate::exec::supervisor::{Invocation, Outcome, ProcessSupervisor};

/// Runs fgtest as a child process with a hard wall-clock bound.
///
/// - stdout and stderr share one append-mode handle on `execution.log`, so
///   their output is interleaved in the order the child wrote it;
/// - stdin is null: the seed travels as an argument, never through stdin;
/// - on timeout the child is killed and reaped before `TimedOut` is reported.
#[derive(Debug, Clone, Default)]
pub struct TokioSupervisor;

impl TokioSupervisor {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSupervisor for TokioSupervisor {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<Outcome>> + Send + 'a>> {
        Box::pin(run_process(invocation))
    }
}

async fn run_process(invocation: &Invocation) -> Result<Outcome> {
    let mut log = ExecutionLog::begin(&invocation.log_path, invocation)?;

    let mut cmd = Command::new(&invocation.executable);
    cmd.args(invocation.command_line.to_args())
        .current_dir(&invocation.working_dir)
        .stdin(std::process::Stdio::null())
        .stdout(log.child_stdio()?)
        .stderr(log.child_stdio()?)
        .kill_on_drop(true);

    if !invocation.environment.is_empty() {
        cmd.env(invocation.environment.var_name, invocation.environment.value());
    }

    info!(
        cmd = %invocation.display_command(),
        taint_options = %invocation.environment,
        timeout_secs = invocation.timeout.as_secs(),
        "starting fgtest process"
    );

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(error = %e, executable = ?invocation.executable, "failed to launch fgtest");
            log.error(&e.to_string())?;
            return Ok(Outcome::LaunchFailed(e.to_string()));
        }
    };

    // Either the process exits on its own, or the deadline passes first.
    match tokio::time::timeout(invocation.timeout, child.wait()).await {
        Ok(Ok(status)) => {
            let code = status.code().unwrap_or(-1);
            info!(exit_code = code, success = status.success(), "fgtest process exited");
            log.exit_code(code)?;
            Ok(Outcome::Exited(code))
        }
        Ok(Err(e)) => {
            warn!(error = %e, "waiting for fgtest process failed");
            log.error(&e.to_string())?;
            Ok(Outcome::LaunchFailed(e.to_string()))
        }
        Err(_elapsed) => {
            warn!(
                timeout_secs = invocation.timeout.as_secs(),
                "fgtest exceeded its time limit; killing process"
            );
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill fgtest process after timeout");
            }
            debug!(log = ?invocation.log_path, "recording timeout in execution log");
            log.timed_out(invocation.timeout)?;
            Ok(Outcome::TimedOut)
        }
    }
}
