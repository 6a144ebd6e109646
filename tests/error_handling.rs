// tests/error_handling.rs

use std::io::Write;
use std::path::PathBuf;

use fgtask::config::{apply_env_overrides, load_and_validate, load_or_default};
use fgtask::errors::FgtaskError;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_full_config_is_loaded() {
    let file = config_file(
        r#"
[service]
fgtest_path = "/opt/fgtest/bin/fgtest"
uploads_dir = "/srv/uploads"
results_dir = "/srv/results"
bin_dir = "/srv/bin"
timeout_secs = 120
max_concurrent_tasks = 4

[submit]
programs = ["dummy", "xor", "lzw"]
default_seed = "0x1a1d"
default_branch_meta = "index.json"
"#,
    );

    let config = load_and_validate(file.path()).unwrap();

    assert_eq!(config.service.fgtest_path, PathBuf::from("/opt/fgtest/bin/fgtest"));
    assert_eq!(config.timeout().as_secs(), 120);
    assert_eq!(config.concurrency_limit(), Some(4));
    assert_eq!(config.submit.programs, vec!["dummy", "xor", "lzw"]);
    assert_eq!(config.submit.default_seed, "0x1a1d");
    assert_eq!(config.submit.default_branch_meta, "index.json");
}

#[test]
fn test_empty_config_uses_defaults() {
    let file = config_file("");

    let config = load_and_validate(file.path()).unwrap();

    assert_eq!(config.timeout().as_secs(), 3600);
    assert_eq!(config.concurrency_limit(), None);
    assert_eq!(config.submit.programs, vec!["dummy", "xor"]);
    assert_eq!(config.submit.default_seed, "0x0402");
    assert_eq!(config.submit.default_branch_meta, "ctwm_index.json");
}

#[test]
fn test_zero_timeout_returns_config_error() {
    let file = config_file("[service]\ntimeout_secs = 0\n");

    match load_and_validate(file.path()) {
        Err(FgtaskError::ConfigError(msg)) => assert!(msg.contains("timeout_secs")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_program_with_path_returns_config_error() {
    let file = config_file("[submit]\nprograms = [\"../../bin/sh\"]\n");

    match load_and_validate(file.path()) {
        Err(FgtaskError::ConfigError(msg)) => assert!(msg.contains("plain file name")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_empty_program_list_returns_config_error() {
    let file = config_file("[submit]\nprograms = []\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(FgtaskError::ConfigError(_))
    ));
}

#[test]
fn test_unknown_key_returns_toml_error() {
    let file = config_file("[service]\ntimeout = 10\n");

    match load_and_validate(file.path()) {
        Err(FgtaskError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let missing = PathBuf::from("/definitely/not/here/Fgtask.toml");

    match load_or_default(Some(missing.as_path())) {
        Err(FgtaskError::ConfigError(msg)) => assert!(msg.contains("does not exist")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_env_override_replaces_fgtest_path() {
    let file = config_file("[service]\nfgtest_path = \"/from/file\"\n");
    let mut config = load_and_validate(file.path()).unwrap();

    apply_env_overrides(&mut config, |key| {
        (key == "FGTEST_PATH").then(|| "/from/env".to_string())
    });
    assert_eq!(config.service.fgtest_path, PathBuf::from("/from/env"));

    // Blank values are ignored.
    apply_env_overrides(&mut config, |_| Some("  ".to_string()));
    assert_eq!(config.service.fgtest_path, PathBuf::from("/from/env"));
}
