// src/config/options.rs

//! Typed per-task options for the fgtest runtime.

use serde::{Deserialize, Serialize};

use crate::errors::{FgtaskError, Result};

/// Taint source used when `taint_file` is not given.
pub const DEFAULT_TAINT_FILE: &str = "stdin";

/// Options controlling fgtest's runtime behaviour for one task.
///
/// Unknown keys are rejected: a typo like `"solveub"` fails the submission
/// instead of being silently ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskOptions {
    /// Tool output directory. Defaults to `<result_dir>/output`; relative
    /// values are resolved against the result directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// Taint source. Defaults to [`DEFAULT_TAINT_FILE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taint_file: Option<String>,

    #[serde(default)]
    pub debug: bool,

    /// Ask the secondary solver to handle undefined behaviour branches.
    #[serde(default)]
    pub solve_ub: bool,
}

impl TaskOptions {
    /// Parse options from a JSON object string.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| FgtaskError::InvalidSubmission(format!("invalid options JSON: {e}")))
    }

    pub fn effective_taint_file(&self) -> &str {
        self.taint_file.as_deref().unwrap_or(DEFAULT_TAINT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let opts = TaskOptions::from_json("{}").unwrap();
        assert_eq!(opts, TaskOptions::default());
        assert_eq!(opts.effective_taint_file(), "stdin");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TaskOptions::from_json(r#"{"solveub": true}"#).unwrap_err();
        assert!(matches!(err, FgtaskError::InvalidSubmission(msg) if msg.contains("solveub")));
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(TaskOptions::from_json("[1,2]").is_err());
        assert!(TaskOptions::from_json("not json").is_err());
    }

    #[test]
    fn all_fields_parse() {
        let opts = TaskOptions::from_json(
            r#"{"output_dir": "out", "taint_file": "seed.bin", "debug": true, "solve_ub": true}"#,
        )
        .unwrap();
        assert_eq!(opts.output_dir.as_deref(), Some("out"));
        assert_eq!(opts.effective_taint_file(), "seed.bin");
        assert!(opts.debug);
        assert!(opts.solve_ub);
    }
}
