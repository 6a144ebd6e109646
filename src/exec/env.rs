// src/exec/env.rs

//! Environment directive contract for fgtest.
//!
//! fgtest reads its runtime switches from a single environment variable,
//! `TAINT_OPTIONS`, holding `key=value` directives joined by `:`. Directives
//! are emitted in a fixed order:
//!
//! 1. `taint_file` (always; defaults to `stdin`)
//! 2. `output_dir` (only when set)
//! 3. `debug=1` (only when enabled)
//! 4. `solve_ub=1` (only when enabled)

use std::fmt;

use crate::config::TaskOptions;

/// Environment variable the directive string is bound to.
pub const TAINT_OPTIONS_VAR: &str = "TAINT_OPTIONS";

pub const DIRECTIVE_SEPARATOR: &str = ":";

/// The directive string plus the variable it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentContract {
    pub var_name: &'static str,
    pub directives: String,
}

impl EnvironmentContract {
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn value(&self) -> &str {
        &self.directives
    }
}

impl fmt::Display for EnvironmentContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.directives)
    }
}

/// Translate task options into the fgtest environment contract.
pub fn build_environment(options: &TaskOptions) -> EnvironmentContract {
    let mut parts = vec![format!("taint_file={}", options.effective_taint_file())];

    if let Some(ref dir) = options.output_dir {
        parts.push(format!("output_dir={dir}"));
    }

    if options.debug {
        parts.push("debug=1".to_string());
    }

    if options.solve_ub {
        parts.push("solve_ub=1".to_string());
    }

    EnvironmentContract {
        var_name: TAINT_OPTIONS_VAR,
        directives: parts.join(DIRECTIVE_SEPARATOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_only_name_the_taint_source() {
        let env = build_environment(&TaskOptions::default());
        assert_eq!(env.value(), "taint_file=stdin");
        assert_eq!(env.var_name, "TAINT_OPTIONS");
    }

    #[test]
    fn debug_and_output_dir_keep_fixed_order() {
        let opts = TaskOptions {
            output_dir: Some("/x".to_string()),
            debug: true,
            ..TaskOptions::default()
        };
        assert_eq!(
            build_environment(&opts).value(),
            "taint_file=stdin:output_dir=/x:debug=1"
        );
    }

    #[test]
    fn everything_enabled() {
        let opts = TaskOptions {
            output_dir: Some("/out".to_string()),
            taint_file: Some("/seeds/a.bin".to_string()),
            debug: true,
            solve_ub: true,
        };
        assert_eq!(
            build_environment(&opts).value(),
            "taint_file=/seeds/a.bin:output_dir=/out:debug=1:solve_ub=1"
        );
    }

    #[test]
    fn solve_ub_without_debug() {
        let opts = TaskOptions {
            solve_ub: true,
            ..TaskOptions::default()
        };
        assert_eq!(build_environment(&opts).value(), "taint_file=stdin:solve_ub=1");
    }
}
