// src/exec/log.rs

//! Per-task execution log.
//!
//! Layout:
//!
//! ```text
//! Command: <fgtest> <target> <seed> <branch_meta> <traces> <rewards>
//! Seed input: <seed>
//! TAINT_OPTIONS: <directives>
//!
//! <interleaved stdout/stderr of fgtest>
//!
//! Exit code: <n>
//! ```
//!
//! The trailer is `ERROR: <reason>` instead when no exit code was observed.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use crate::exec::supervisor::Invocation;

#[derive(Debug)]
pub struct ExecutionLog {
    file: File,
}

impl ExecutionLog {
    /// Truncate (or create) the log and write the header.
    pub fn begin(path: &Path, invocation: &Invocation) -> io::Result<Self> {
        File::create(path)?;
        let file = OpenOptions::new().append(true).open(path)?;
        let mut log = Self { file };

        writeln!(log.file, "Command: {}", invocation.display_command())?;
        writeln!(log.file, "Seed input: {}", invocation.command_line.seed)?;
        writeln!(log.file, "TAINT_OPTIONS: {}", invocation.environment)?;
        writeln!(log.file)?;
        log.file.flush()?;
        Ok(log)
    }

    /// A fresh append-mode handle for a child's stdout or stderr.
    pub fn child_stdio(&self) -> io::Result<Stdio> {
        Ok(Stdio::from(self.file.try_clone()?))
    }

    pub fn exit_code(&mut self, code: i32) -> io::Result<()> {
        write!(self.file, "\n\nExit code: {code}\n")?;
        self.file.flush()
    }

    pub fn timed_out(&mut self, timeout: Duration) -> io::Result<()> {
        self.error(&format!("Task timeout ({} seconds)", timeout.as_secs()))
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        write!(self.file, "\n\nERROR: {message}\n")?;
        self.file.flush()
    }
}
