// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FgtaskError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FgtaskError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.service, raw.submit))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_service(cfg)?;
    validate_programs(cfg)?;
    validate_submit_defaults(cfg)?;
    Ok(())
}

fn validate_service(cfg: &RawConfigFile) -> Result<()> {
    if cfg.service.timeout_secs == 0 {
        return Err(FgtaskError::ConfigError(
            "[service].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.service.fgtest_path.as_os_str().is_empty() {
        return Err(FgtaskError::ConfigError(
            "[service].fgtest_path must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_programs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.submit.programs.is_empty() {
        return Err(FgtaskError::ConfigError(
            "[submit].programs must list at least one program".to_string(),
        ));
    }

    for name in cfg.submit.programs.iter() {
        if !is_plain_file_name(name) {
            return Err(FgtaskError::ConfigError(format!(
                "[submit].programs entry '{}' must be a plain file name",
                name
            )));
        }
    }
    Ok(())
}

fn validate_submit_defaults(cfg: &RawConfigFile) -> Result<()> {
    if cfg.submit.default_seed.is_empty() {
        return Err(FgtaskError::ConfigError(
            "[submit].default_seed must not be empty".to_string(),
        ));
    }

    if !is_plain_file_name(&cfg.submit.default_branch_meta) {
        return Err(FgtaskError::ConfigError(format!(
            "[submit].default_branch_meta '{}' must be a plain file name",
            cfg.submit.default_branch_meta
        )));
    }
    Ok(())
}

/// A single path component that cannot escape its parent directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.service.timeout_secs, 3600);
        assert_eq!(cfg.concurrency_limit(), None);
        assert_eq!(cfg.submit.programs, vec!["dummy", "xor"]);
    }

    #[test]
    fn program_names_cannot_traverse() {
        let mut raw = RawConfigFile::default();
        raw.submit.programs = vec!["../sh".to_string()];
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(matches!(err, FgtaskError::ConfigError(msg) if msg.contains("plain file name")));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.service.timeout_secs = 0;
        assert!(ConfigFile::try_from(raw).is_err());
    }
}
