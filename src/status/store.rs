// src/status/store.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::errors::{FgtaskError, Result};
use crate::failure::TaskFailure;
use crate::fs::FileSystem;
use crate::status::record::StatusRecord;
use crate::types::{TaskId, TaskStatus};

/// File name of the status document inside a task's result directory.
pub const STATUS_FILE: &str = "status.json";

const STATUS_TMP_FILE: &str = "status.json.tmp";

/// Read-modify-write access to per-task status documents.
///
/// There is no locking: exactly one orchestration run writes a given
/// task's record, and every write replaces the file atomically so pollers
/// never see a partial document.
#[derive(Debug, Clone)]
pub struct StatusStore {
    fs: Arc<dyn FileSystem>,
}

impl StatusStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    pub fn status_path(task_dir: &Path) -> PathBuf {
        task_dir.join(STATUS_FILE)
    }

    /// Load the record of a task.
    ///
    /// A missing file is `TaskNotFound`; an unreadable or unparseable one is
    /// `CorruptStatus`.
    pub fn read(&self, task_dir: &Path) -> Result<StatusRecord> {
        match self.load(task_dir)? {
            Some(record) => Ok(record),
            None => Err(FgtaskError::TaskNotFound(task_id_from_dir(task_dir))),
        }
    }

    /// Persist the initial record of a freshly submitted task.
    pub fn create(&self, task_dir: &Path, record: &StatusRecord) -> Result<()> {
        if let Some(existing) = self.load(task_dir)? {
            return Err(FgtaskError::InvalidTransition {
                from: existing.status,
                to: record.status,
            });
        }
        self.persist(task_dir, record)
    }

    /// Move a task to `status`, attaching an error or result when given.
    ///
    /// `started_at` and `completed_at` are only ever filled in, never
    /// overwritten. Returns the record as written.
    pub fn write(
        &self,
        task_dir: &Path,
        status: TaskStatus,
        failure: Option<&TaskFailure>,
        result: Option<Value>,
    ) -> Result<StatusRecord> {
        let now = Utc::now();
        let mut record = match self.load(task_dir)? {
            Some(existing) => {
                if !existing.status.can_transition_to(status) {
                    return Err(FgtaskError::InvalidTransition {
                        from: existing.status,
                        to: status,
                    });
                }
                existing
            }
            None => StatusRecord::empty(status, now),
        };

        record.status = status;
        record.updated_at = now;

        if let Some(failure) = failure {
            record.error = Some(failure.to_string());
            record.error_kind = Some(failure.kind().to_string());
        }

        // `null` is stored as an absent result, so the returned record must agree.
        if let Some(result) = result.filter(|r| !r.is_null()) {
            record.result = Some(result);
        }

        if status == TaskStatus::Running && record.started_at.is_none() {
            record.started_at = Some(now);
        }

        if status.is_terminal() && record.completed_at.is_none() {
            record.completed_at = Some(now);
        }

        self.persist(task_dir, &record)?;
        debug!(task_dir = ?task_dir, status = %status, "status record written");
        Ok(record)
    }

    fn load(&self, task_dir: &Path) -> Result<Option<StatusRecord>> {
        let path = Self::status_path(task_dir);
        if !self.fs.exists(&path) {
            return Ok(None);
        }

        let contents = self
            .fs
            .read_to_string(&path)
            .map_err(|e| FgtaskError::CorruptStatus {
                path: path.clone(),
                reason: format!("{e:#}"),
            })?;

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| FgtaskError::CorruptStatus {
                path,
                reason: e.to_string(),
            })
    }

    fn persist(&self, task_dir: &Path, record: &StatusRecord) -> Result<()> {
        let body = serde_json::to_vec_pretty(record)
            .map_err(|e| FgtaskError::Other(anyhow::Error::from(e)))?;

        let tmp = task_dir.join(STATUS_TMP_FILE);
        self.fs.write(&tmp, &body)?;
        self.fs.rename(&tmp, &Self::status_path(task_dir))?;
        Ok(())
    }
}

/// Best-effort task id for error messages: the directory name.
fn task_id_from_dir(task_dir: &Path) -> TaskId {
    task_dir
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| TaskId::parse(n).ok())
        .unwrap_or_else(TaskId::unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::types::BranchMetaSource;

    fn store_with(fs: &MockFileSystem) -> StatusStore {
        StatusStore::new(Arc::new(fs.clone()))
    }

    fn pending(task_dir: &Path, store: &StatusStore) {
        let rec = StatusRecord::pending(
            TaskId::parse("t1").unwrap(),
            "seed",
            "dummy",
            BranchMetaSource::Uploaded,
            Utc::now(),
        );
        store.create(task_dir, &rec).unwrap();
    }

    #[test]
    fn read_missing_is_not_found() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let err = store.read(Path::new("/results/t1")).unwrap_err();
        assert!(matches!(err, FgtaskError::TaskNotFound(id) if id.as_str() == "t1"));
    }

    #[test]
    fn read_corrupt_is_fatal() {
        let fs = MockFileSystem::new();
        fs.add_file("/results/t1/status.json", b"{not json".to_vec());
        let err = store_with(&fs).read(Path::new("/results/t1")).unwrap_err();
        assert!(matches!(err, FgtaskError::CorruptStatus { .. }));
    }

    #[test]
    fn write_without_record_starts_empty() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let rec = store
            .write(Path::new("/results/t9"), TaskStatus::Running, None, None)
            .unwrap();
        assert_eq!(rec.status, TaskStatus::Running);
        assert!(rec.started_at.is_some());
        assert!(rec.task_id.is_none());
        assert!(!fs.exists(Path::new("/results/t9/status.json.tmp")));
    }

    #[test]
    fn timestamps_are_set_once() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let dir = Path::new("/results/t1");
        pending(dir, &store);

        let running = store.write(dir, TaskStatus::Running, None, None).unwrap();
        let started = running.started_at.unwrap();
        assert!(running.completed_at.is_none());

        let done = store
            .write(dir, TaskStatus::Completed, None, Some(serde_json::json!({"r": 1})))
            .unwrap();
        assert_eq!(done.started_at, Some(started));
        assert!(done.completed_at.is_some());
        assert!(done.updated_at >= running.updated_at);
        assert_eq!(done.program.as_deref(), Some("dummy"));
    }

    #[test]
    fn terminal_records_reject_further_writes() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let dir = Path::new("/results/t1");
        pending(dir, &store);
        store.write(dir, TaskStatus::Running, None, None).unwrap();
        let failed = store
            .write(dir, TaskStatus::Failed, Some(&TaskFailure::MissingArtifact), None)
            .unwrap();

        let err = store
            .write(dir, TaskStatus::Completed, None, Some(serde_json::json!({})))
            .unwrap_err();
        assert!(matches!(
            err,
            FgtaskError::InvalidTransition { from: TaskStatus::Failed, to: TaskStatus::Completed }
        ));
        assert_eq!(store.read(dir).unwrap(), failed);
    }

    #[test]
    fn failure_sets_message_and_kind() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let dir = Path::new("/results/t1");
        pending(dir, &store);
        store.write(dir, TaskStatus::Running, None, None).unwrap();
        let rec = store
            .write(dir, TaskStatus::Failed, Some(&TaskFailure::NonZeroExit(3)), None)
            .unwrap();
        assert_eq!(rec.error.as_deref(), Some("fgtest exited with code 3"));
        assert_eq!(rec.error_kind.as_deref(), Some("non_zero_exit"));
        assert!(rec.result.is_none());
    }

    #[test]
    fn create_refuses_existing_record() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let dir = Path::new("/results/t1");
        pending(dir, &store);
        let rec = store.read(dir).unwrap();
        assert!(store.create(dir, &rec).is_err());
    }

    #[test]
    fn failed_write_leaves_previous_record() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let dir = Path::new("/results/t1");
        pending(dir, &store);
        fs.deny_writes(dir);

        assert!(store.write(dir, TaskStatus::Running, None, None).is_err());
        assert_eq!(store.read(dir).unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn null_result_reads_back_as_written() {
        let fs = MockFileSystem::new();
        let store = store_with(&fs);
        let dir = Path::new("/results/t1");
        pending(dir, &store);
        store.write(dir, TaskStatus::Running, None, None).unwrap();

        let written = store
            .write(dir, TaskStatus::Completed, None, Some(serde_json::Value::Null))
            .unwrap();
        assert!(written.result.is_none());
        assert_eq!(store.read(dir).unwrap(), written);
    }

    #[test]
    fn missing_record_under_odd_dir_name_reports_unknown_id() {
        let fs = MockFileSystem::new();
        let err = store_with(&fs).read(Path::new("/results/not.an.id")).unwrap_err();
        assert!(matches!(err, FgtaskError::TaskNotFound(id) if id.as_str() == "unknown"));
    }
}
