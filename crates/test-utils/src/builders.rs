#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fgtask::config::{ConfigFile, RawConfigFile, TaskOptions};
use fgtask::engine::TaskSpec;
use fgtask::fs::mock::MockFileSystem;
use fgtask::status::{StatusRecord, StatusStore};
use fgtask::types::{BranchMetaSource, TaskId};

/// Builder for `ConfigFile` rooted at one directory.
///
/// `uploads/`, `results/` and `bin/` live under `root`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut config = RawConfigFile::default();
        config.service.uploads_dir = root.join("uploads");
        config.service.results_dir = root.join("results");
        config.service.bin_dir = root.join("bin");
        config.service.fgtest_path = root.join("fgtest");
        Self { config }
    }

    pub fn fgtest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.service.fgtest_path = path.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.service.timeout_secs = secs;
        self
    }

    pub fn max_concurrent_tasks(mut self, n: usize) -> Self {
        self.config.service.max_concurrent_tasks = n;
        self
    }

    pub fn programs(mut self, programs: &[&str]) -> Self {
        self.config.submit.programs = programs.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn default_seed(mut self, seed: &str) -> Self {
        self.config.submit.default_seed = seed.to_string();
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

/// Builder for a staged `TaskSpec` under `/results/<id>` and `/uploads/<id>`.
pub struct TaskSpecBuilder {
    task: TaskSpec,
}

impl TaskSpecBuilder {
    pub fn new(id: &str) -> Self {
        let id = TaskId::parse(id).expect("valid test task id");
        Self {
            task: TaskSpec {
                target_path: PathBuf::from("/bin/dummy"),
                seed: "0x0402".to_string(),
                branch_meta_path: PathBuf::from("/bin/ctwm_index.json"),
                traces_path: PathBuf::from(format!("/uploads/{id}/traces.json")),
                result_dir: PathBuf::from(format!("/results/{id}")),
                options: TaskOptions::default(),
                id,
            },
        }
    }

    pub fn result_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.task.result_dir = dir.into();
        self
    }

    pub fn seed(mut self, seed: &str) -> Self {
        self.task.seed = seed.to_string();
        self
    }

    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.task.target_path = path.into();
        self
    }

    pub fn branch_meta(mut self, path: impl Into<PathBuf>) -> Self {
        self.task.branch_meta_path = path.into();
        self
    }

    pub fn traces(mut self, path: impl Into<PathBuf>) -> Self {
        self.task.traces_path = path.into();
        self
    }

    pub fn output_dir(mut self, dir: &str) -> Self {
        self.task.options.output_dir = Some(dir.to_string());
        self
    }

    pub fn taint_file(mut self, file: &str) -> Self {
        self.task.options.taint_file = Some(file.to_string());
        self
    }

    pub fn debug(mut self, val: bool) -> Self {
        self.task.options.debug = val;
        self
    }

    pub fn solve_ub(mut self, val: bool) -> Self {
        self.task.options.solve_ub = val;
        self
    }

    pub fn build(self) -> TaskSpec {
        self.task
    }

    /// Build and also create the `pending` record the submission step
    /// would have written.
    pub fn build_pending(self, fs: &MockFileSystem) -> TaskSpec {
        let task = self.build();
        let record = StatusRecord::pending(
            task.id.clone(),
            task.seed.clone(),
            "dummy",
            BranchMetaSource::Default,
            chrono::Utc::now(),
        );
        StatusStore::new(Arc::new(fs.clone()))
            .create(&task.result_dir, &record)
            .expect("creating pending record");
        task
    }
}
