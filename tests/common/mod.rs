#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub use fgtask_test_utils::{init_tracing, with_timeout};

/// Shell used to run generated fake-fgtest scripts.
///
/// Scripts are passed to `/bin/sh` as the first argument rather than
/// executed directly, which sidesteps `ETXTBSY` when a test thread forks
/// while another one still holds a freshly written script open.
pub const SHELL: &str = "/bin/sh";

/// Write a shell script body to `dir/name` and return its path.
///
/// When run as `sh <script> <seed> <branch_meta> <traces> <rewards>`, the
/// script sees the seed as `$1` and the rewards path as `$4`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("writing script");
    path
}
