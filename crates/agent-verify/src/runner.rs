//! Test Runner (C6).
//!
//! Executes the configured test command and reports `{failed, output}`.
//! Never surfaces a non-zero exit as an error — only a missing interpreter
//! or non-UTF-8 output is a genuine `VerifyError`.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::VerifyError;

/// Result of running the configured test command once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunResult {
    pub failed: bool,
    pub output: String,
    pub exit_code: Option<i32>,
}

/// Run `command` inside `cwd` via `bash -lc`, capturing both standard
/// output streams into a single interleaved report.
pub fn run_tests(command: &str, cwd: &Path) -> Result<TestRunResult, VerifyError> {
    if command.trim().is_empty() {
        return Ok(TestRunResult {
            failed: false,
            output: "(no test command configured)".to_string(),
            exit_code: Some(0),
        });
    }

    debug!(%command, cwd = %cwd.display(), "running test command");

    let output = Command::new("bash")
        .arg("-lc")
        .arg(command)
        .current_dir(cwd)
        .output()
        .map_err(|source| VerifyError::Io {
            command: command.to_string(),
            source,
        })?;

    let stdout = String::from_utf8(output.stdout).map_err(|source| VerifyError::NonUtf8Output {
        command: command.to_string(),
        stream: "stdout",
        source,
    })?;
    let stderr = String::from_utf8(output.stderr).map_err(|source| VerifyError::NonUtf8Output {
        command: command.to_string(),
        stream: "stderr",
        source,
    })?;

    let failed = !output.status.success();
    if failed {
        warn!(%command, exit_code = ?output.status.code(), "test command failed");
    }

    let mut combined = String::with_capacity(stdout.len() + stderr.len() + 16);
    combined.push_str(&stdout);
    if !stderr.is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&stderr);
    }

    Ok(TestRunResult {
        failed,
        output: combined,
        exit_code: output.status.code(),
    })
}
