// src/types.rs

//! Small value types shared across the engine.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::FgtaskError;

/// Opaque, immutable task identifier.
///
/// Freshly generated ids are 8 lowercase hex characters. Ids coming from the
/// outside (CLI, status queries) are accepted if they are 1-64 characters of
/// `[A-Za-z0-9_-]`, which keeps them safe to use as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

fn task_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("static regex is valid"))
}

impl TaskId {
    /// Generate a new short id (first 8 hex chars of a v4 UUID).
    pub fn generate() -> Self {
        let simple = uuid::Uuid::new_v4().simple().to_string();
        Self(simple[..8].to_string())
    }

    /// Validate an externally supplied id.
    pub fn parse(raw: &str) -> Result<Self, FgtaskError> {
        if task_id_pattern().is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(FgtaskError::InvalidTaskId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder for errors about a directory whose name is not an id.
    pub(crate) fn unknown() -> Self {
        Self("unknown".to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = FgtaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaskId {
    type Error = FgtaskError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

/// Lifecycle state of a task.
///
/// `pending -> running -> {completed | failed}`; both terminal states are
/// final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Whether a record currently in `self` may be rewritten as `next`.
    ///
    /// A terminal write straight from `pending` is allowed so that a task
    /// whose `running` write failed can still be finalised.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        match (self, next) {
            (TaskStatus::Pending, TaskStatus::Running) => true,
            (TaskStatus::Pending | TaskStatus::Running, n) if n.is_terminal() => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the branch-metadata file of a task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchMetaSource {
    Uploaded,
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_short_hex() {
        let id = TaskId::generate();
        assert_eq!(id.as_str().len(), 8);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, TaskId::generate());
    }

    #[test]
    fn parse_rejects_traversal() {
        assert!(TaskId::parse("../etc").is_err());
        assert!(TaskId::parse("a/b").is_err());
        assert!(TaskId::parse("").is_err());
        assert!(TaskId::parse("abc123_-X").is_ok());
    }

    #[test]
    fn transitions_follow_lifecycle() {
        use TaskStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Failed));
        assert!(Pending.can_transition_to(Failed));

        assert!(!Running.can_transition_to(Running));
        assert!(!Running.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Running));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TaskStatus::Completed).unwrap(), "\"completed\"");
        assert_eq!(
            serde_json::to_string(&BranchMetaSource::Uploaded).unwrap(),
            "\"uploaded\""
        );
    }
}
