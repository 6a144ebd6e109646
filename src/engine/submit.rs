// src/engine/submit.rs

//! Submission: assign identity, stage inputs, create the `pending` record.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::{ConfigFile, TaskOptions};
use crate::engine::TaskSpec;
use crate::errors::{FgtaskError, Result};
use crate::fs::FileSystem;
use crate::status::{StatusRecord, StatusStore};
use crate::types::{BranchMetaSource, TaskId};

/// Staged copy of an uploaded branch-metadata file.
pub const BRANCH_META_FILE: &str = "branch_meta.json";

/// Staged copy of the uploaded traces file.
pub const TRACES_FILE: &str = "traces.json";

/// What a caller asks for. Uploaded files arrive as raw bytes.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub program: String,
    pub seed: Option<String>,
    pub branch_meta: Option<Vec<u8>>,
    pub traces: Vec<u8>,
    /// JSON object, see [`TaskOptions`].
    pub options: Option<String>,
}

/// A staged task together with the facts reported back to the submitter.
#[derive(Debug, Clone)]
pub struct Submission {
    pub task: TaskSpec,
    pub program: String,
    pub branch_meta_source: BranchMetaSource,
}

#[derive(Debug, Clone)]
pub struct Submitter {
    config: Arc<ConfigFile>,
    fs: Arc<dyn FileSystem>,
    store: StatusStore,
}

impl Submitter {
    pub fn new(config: Arc<ConfigFile>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            config,
            store: StatusStore::new(Arc::clone(&fs)),
            fs,
        }
    }

    /// Validate and stage a request. On success the task has a `pending`
    /// record and is ready to be handed to the orchestrator.
    pub fn submit(&self, request: SubmitRequest) -> Result<Submission> {
        self.check_program(&request.program)?;

        let options = match request.options.as_deref() {
            Some(raw) if !raw.trim().is_empty() => TaskOptions::from_json(raw)?,
            _ => TaskOptions::default(),
        };

        let id = TaskId::generate();
        let upload_dir = self.make_task_dir(&self.config.service.uploads_dir, &id)?;
        let result_dir = self.make_task_dir(&self.config.service.results_dir, &id)?;
        debug!(task_id = %id, ?upload_dir, ?result_dir, "task directories created");

        let target_path = self.resolve_target(&request.program)?;

        let seed = match request.seed {
            Some(seed) if !seed.is_empty() => seed,
            _ => self.config.submit.default_seed.clone(),
        };

        let (branch_meta_path, branch_meta_source) = match request.branch_meta {
            Some(bytes) => {
                let path = upload_dir.join(BRANCH_META_FILE);
                self.fs.write(&path, &bytes)?;
                (path, BranchMetaSource::Uploaded)
            }
            None => (
                self.resolve_default_branch_meta(&request.program)?,
                BranchMetaSource::Default,
            ),
        };

        let traces_path = upload_dir.join(TRACES_FILE);
        self.fs.write(&traces_path, &request.traces)?;

        let record = StatusRecord::pending(
            id.clone(),
            seed.clone(),
            request.program.clone(),
            branch_meta_source,
            Utc::now(),
        );
        self.store.create(&result_dir, &record)?;

        info!(
            task_id = %id,
            program = %request.program,
            branch_meta_source = ?branch_meta_source,
            "task submitted"
        );

        Ok(Submission {
            task: TaskSpec {
                id,
                target_path,
                seed,
                branch_meta_path,
                traces_path,
                result_dir,
                options,
            },
            program: request.program,
            branch_meta_source,
        })
    }

    fn check_program(&self, program: &str) -> Result<()> {
        if self.config.submit.programs.iter().any(|p| p == program) {
            Ok(())
        } else {
            Err(FgtaskError::InvalidSubmission(format!(
                "program must be one of {:?} (got '{}')",
                self.config.submit.programs, program
            )))
        }
    }

    /// Create `<root>/<id>` and return its absolute path.
    fn make_task_dir(&self, root: &Path, id: &TaskId) -> Result<PathBuf> {
        let dir = root.join(id.as_str());
        self.fs.create_dir_all(&dir)?;
        Ok(self.fs.canonicalize(&dir)?)
    }

    fn resolve_target(&self, program: &str) -> Result<PathBuf> {
        let path = self.config.service.bin_dir.join(program);
        if !self.fs.is_file(&path) {
            return Err(FgtaskError::InvalidSubmission(format!(
                "program '{}' not found in {:?}",
                program, self.config.service.bin_dir
            )));
        }
        Ok(self.fs.canonicalize(&path)?)
    }

    /// Program-specific index first, then the generic one. Neither existing
    /// is an error.
    fn resolve_default_branch_meta(&self, program: &str) -> Result<PathBuf> {
        let bin_dir = &self.config.service.bin_dir;
        let generic = &self.config.submit.default_branch_meta;
        let candidates = [bin_dir.join(format!("{program}_{generic}")), bin_dir.join(generic)];

        for candidate in candidates.iter() {
            if self.fs.is_file(candidate) {
                return Ok(self.fs.canonicalize(candidate)?);
            }
        }

        Err(FgtaskError::InvalidSubmission(format!(
            "no branch metadata uploaded and no default found (tried {:?})",
            candidates
        )))
    }
}
