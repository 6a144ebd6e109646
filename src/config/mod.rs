// src/config/mod.rs

//! Configuration: the service-level TOML file and per-task options.
//!
//! - [`model`] holds the serde data model of `Fgtask.toml`.
//! - [`loader`] reads it from disk and applies environment overrides.
//! - [`validate`] turns a `RawConfigFile` into a checked `ConfigFile`.
//! - [`options`] is the typed replacement for the loose per-task options map.

pub mod loader;
pub mod model;
pub mod options;
pub mod validate;

pub use loader::{
    apply_env_overrides, default_config_path, load_and_validate, load_or_default,
    resolve_fgtest_path,
};
pub use model::{ConfigFile, RawConfigFile, ServiceSection, SubmitSection};
pub use options::TaskOptions;
