// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod failure;
pub mod fs;
pub mod logging;
pub mod status;
pub mod types;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use crate::cli::{CliArgs, Command, RunArgs};
use crate::config::{ConfigFile, load_or_default};
use crate::engine::{SubmitRequest, TaskService};
use crate::exec::TokioSupervisor;
use crate::fs::RealFileSystem;
use crate::types::TaskStatus;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + environment overrides)
/// - the task service (submission, orchestrator, dispatch)
/// - the real filesystem and the tokio process supervisor
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let cfg = load_or_default(args.config.as_deref())?;

    match args.command {
        Command::Check => {
            print_check(&cfg);
            Ok(ExitCode::SUCCESS)
        }
        Command::Run(run_args) => run_task(&build_service(cfg), run_args).await,
        Command::Status { task_id } => {
            let record = build_service(cfg).status(&task_id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Result { task_id } => {
            let path = build_service(cfg).result_path(&task_id)?;
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("reading result file {:?}", path))?;
            print!("{contents}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_service(cfg: ConfigFile) -> TaskService {
    TaskService::new(
        cfg,
        Arc::new(RealFileSystem),
        Arc::new(TokioSupervisor::new()),
        info_span!("fgtask"),
    )
}

/// Submit, wait for the background worker, print the final record.
async fn run_task(service: &TaskService, args: RunArgs) -> Result<ExitCode> {
    let traces = std::fs::read(&args.traces)
        .with_context(|| format!("reading traces file {:?}", args.traces))?;
    let branch_meta = match args.branch_meta {
        Some(ref path) => Some(
            std::fs::read(path).with_context(|| format!("reading branch metadata {:?}", path))?,
        ),
        None => None,
    };

    let request = SubmitRequest {
        program: args.program,
        seed: args.seed,
        branch_meta,
        traces,
        options: args.options,
    };

    let (receipt, handle) = service.submit(request)?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    info!(task_id = %receipt.task_id, "waiting for task to finish");

    handle.join().await?;
    let record = service.status(receipt.task_id.as_str())?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    debug!(status = %record.status, "task finished");
    if record.status == TaskStatus::Completed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Print effective settings without running anything.
fn print_check(cfg: &ConfigFile) {
    println!("fgtask config check");
    println!("  service.fgtest_path = {:?}", cfg.service.fgtest_path);
    println!("  service.uploads_dir = {:?}", cfg.service.uploads_dir);
    println!("  service.results_dir = {:?}", cfg.service.results_dir);
    println!("  service.bin_dir = {:?}", cfg.service.bin_dir);
    println!("  service.timeout_secs = {}", cfg.service.timeout_secs);
    match cfg.concurrency_limit() {
        Some(n) => println!("  service.max_concurrent_tasks = {n}"),
        None => println!("  service.max_concurrent_tasks = unbounded"),
    }
    println!("  submit.programs = {:?}", cfg.submit.programs);
    println!("  submit.default_seed = {}", cfg.submit.default_seed);
    println!("  submit.default_branch_meta = {}", cfg.submit.default_branch_meta);

    for program in cfg.submit.programs.iter() {
        let path = cfg.service.bin_dir.join(program);
        let state = if path.is_file() { "ok" } else { "MISSING" };
        println!("  program {program}: {:?} [{state}]", path);
    }

    debug!("config check complete (no execution)");
}
