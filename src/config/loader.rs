// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FgtaskError, Result};

/// Environment variable that overrides `[service].fgtest_path`.
pub const FGTEST_PATH_ENV: &str = "FGTEST_PATH";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the config the binary should run with.
///
/// - An explicit path must exist.
/// - Without one, `Fgtask.toml` is used if present; otherwise the built-in
///   defaults apply.
///
/// Environment overrides are applied in both cases.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    let mut config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(FgtaskError::ConfigError(format!(
                    "config file {:?} does not exist",
                    path
                )));
            }
            load_and_validate(path)?
        }
        None => {
            let path = default_config_path();
            if path.exists() {
                load_and_validate(&path)?
            } else {
                debug!(?path, "no config file found; using defaults");
                ConfigFile::try_from(RawConfigFile::default())?
            }
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    let cwd = std::env::current_dir()?;
    resolve_fgtest_path(&mut config, &cwd);
    Ok(config)
}

/// Make a relative `fgtest_path` absolute against `base`.
///
/// fgtest runs with the task's result directory as its working directory,
/// so a relative executable path must be fixed before any task starts.
pub fn resolve_fgtest_path(config: &mut ConfigFile, base: &Path) {
    let path = &config.service.fgtest_path;
    if path.is_relative() {
        let absolute = base.join(path);
        debug!(from = ?path, to = ?absolute, "resolved relative fgtest path");
        config.service.fgtest_path = absolute;
    }
}

/// Apply environment overrides using the given lookup.
///
/// Taking the lookup as a closure keeps tests independent of the process
/// environment.
pub fn apply_env_overrides<F>(config: &mut ConfigFile, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(FGTEST_PATH_ENV).filter(|p| !p.trim().is_empty()) {
        debug!(fgtest_path = %path, "fgtest path overridden from environment");
        config.service.fgtest_path = PathBuf::from(path);
    }
}

/// Default config location: `Fgtask.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Fgtask.toml")
}
