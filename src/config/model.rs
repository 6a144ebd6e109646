// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [service]
/// fgtest_path = "../build/bin/fgtest"
/// uploads_dir = "uploads"
/// results_dir = "results"
/// bin_dir = "bin"
/// timeout_secs = 3600
/// max_concurrent_tasks = 0
///
/// [submit]
/// programs = ["dummy", "xor"]
/// default_seed = "0x0402"
/// default_branch_meta = "ctwm_index.json"
/// ```
///
/// All sections are optional and have reasonable defaults. This type is the
/// unvalidated form; the rest of the crate works with [`ConfigFile`].
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub submit: SubmitSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub service: ServiceSection,
    pub submit: SubmitSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(service: ServiceSection, submit: SubmitSection) -> Self {
        Self { service, submit }
    }

    /// Wall-clock bound for one fgtest invocation.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    /// `None` means one worker per task with no cap.
    pub fn concurrency_limit(&self) -> Option<usize> {
        match self.service.max_concurrent_tasks {
            0 => None,
            n => Some(n),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ServiceSection::default(), SubmitSection::default())
    }
}

/// `[service]` section: where things live and how long fgtest may run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    /// fgtest executable. Overridden by the `FGTEST_PATH` env var.
    #[serde(default = "default_fgtest_path")]
    pub fgtest_path: PathBuf,

    /// Per-task input staging root (`<uploads_dir>/<task_id>/`).
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// Per-task result root (`<results_dir>/<task_id>/`).
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Directory holding target programs and default branch metadata.
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 0 keeps the unbounded one-worker-per-task behaviour.
    #[serde(default)]
    pub max_concurrent_tasks: usize,
}

fn default_fgtest_path() -> PathBuf {
    PathBuf::from("../build/bin/fgtest")
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("bin")
}

fn default_timeout_secs() -> u64 {
    3600
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            fgtest_path: default_fgtest_path(),
            uploads_dir: default_uploads_dir(),
            results_dir: default_results_dir(),
            bin_dir: default_bin_dir(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_tasks: 0,
        }
    }
}

/// `[submit]` section: what a submission may ask for.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitSection {
    /// Allowed program names, resolved as `<bin_dir>/<name>`.
    #[serde(default = "default_programs")]
    pub programs: Vec<String>,

    #[serde(default = "default_seed")]
    pub default_seed: String,

    /// File name of the generic branch-metadata index under `bin_dir`.
    ///
    /// A program-specific `<program>_<default_branch_meta>` is preferred
    /// when it exists.
    #[serde(default = "default_branch_meta")]
    pub default_branch_meta: String,
}

fn default_programs() -> Vec<String> {
    vec!["dummy".to_string(), "xor".to_string()]
}

fn default_seed() -> String {
    "0x0402".to_string()
}

fn default_branch_meta() -> String {
    "ctwm_index.json".to_string()
}

impl Default for SubmitSection {
    fn default() -> Self {
        Self {
            programs: default_programs(),
            default_seed: default_seed(),
            default_branch_meta: default_branch_meta(),
        }
    }
}
