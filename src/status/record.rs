// src/status/record.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{BranchMetaSource, TaskId, TaskStatus};

/// Externally visible state of one task.
///
/// Unset optional fields are omitted from the document; `null` and absent
/// both read back as `None`, while an empty object in `result` stays
/// `Some`. Fields this version does not know about are carried in `extra`
/// and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,

    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    pub updated_at: DateTime<Utc>,

    /// Set once, on the first transition into `running`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Set once, on entry into a terminal state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_meta_source: Option<BranchMetaSource>,

    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Stable machine-readable failure code, see [`crate::failure::TaskFailure::kind`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Parsed rewards document of a completed task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusRecord {
    /// Record as written by a write against a task directory with no record.
    pub fn empty(status: TaskStatus, now: DateTime<Utc>) -> Self {
        Self {
            task_id: None,
            status,
            created_at: None,
            updated_at: now,
            started_at: None,
            completed_at: None,
            seed: None,
            program: None,
            branch_meta_source: None,
            error: None,
            error_kind: None,
            result: None,
            extra: Map::new(),
        }
    }

    /// Initial `pending` record created at submission.
    pub fn pending(
        task_id: TaskId,
        seed: impl Into<String>,
        program: impl Into<String>,
        branch_meta_source: BranchMetaSource,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id: Some(task_id),
            created_at: Some(now),
            seed: Some(seed.into()),
            program: Some(program.into()),
            branch_meta_source: Some(branch_meta_source),
            ..Self::empty(TaskStatus::Pending, now)
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn pending_record_omits_unset_fields() {
        let rec = StatusRecord::pending(
            TaskId::parse("abcd1234").unwrap(),
            "0x0402",
            "dummy",
            BranchMetaSource::Default,
            fixed_now(),
        );
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["task_id"], "abcd1234");
        assert_eq!(v["status"], "pending");
        assert_eq!(v["branch_meta_source"], "default");
        assert!(v.get("result").is_none());
        assert!(v.get("error").is_none());
        assert!(v.get("started_at").is_none());
    }

    #[test]
    fn null_and_absent_read_as_unset_but_empty_object_does_not() {
        let with_nulls = r#"{"status":"pending","updated_at":"2024-01-01T12:00:00Z","error":null,"result":null}"#;
        let rec: StatusRecord = serde_json::from_str(with_nulls).unwrap();
        assert_eq!(rec.result, None);
        assert_eq!(rec.error, None);

        let with_empty = r#"{"status":"completed","updated_at":"2024-01-01T12:00:00Z","result":{}}"#;
        let rec: StatusRecord = serde_json::from_str(with_empty).unwrap();
        assert_eq!(rec.result, Some(serde_json::json!({})));
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = r#"{"status":"running","updated_at":"2024-01-01T12:00:00Z","node":"worker-7"}"#;
        let rec: StatusRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.extra.get("node"), Some(&serde_json::json!("worker-7")));

        let back = serde_json::to_value(&rec).unwrap();
        assert_eq!(back["node"], "worker-7");
    }
}
