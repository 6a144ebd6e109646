// src/status/mod.rs

//! Durable, file-backed status records.
//!
//! One JSON document per task at `<results_dir>/<task_id>/status.json`. It is
//! the only channel through which a caller observes a task after submission.

pub mod record;
pub mod store;

pub use record::StatusRecord;
pub use store::{STATUS_FILE, StatusStore};
