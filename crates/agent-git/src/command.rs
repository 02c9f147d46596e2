use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::GitError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Thin wrapper around the `git` CLI. Every invocation is an argument array,
/// never a shell-interpolated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCli {
    pub binary: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn run<I, S>(&self, cwd: &Path, args: I) -> Result<GitOutput, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let owned_args: Vec<OsString> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();

        let mut command = Command::new(&self.binary);
        command.current_dir(cwd);
        for arg in &owned_args {
            command.arg(arg);
        }

        let rendered = render_command(&self.binary, &owned_args);
        tracing::debug!(command = %rendered, cwd = %cwd.display(), "running git command");

        let output = command.output().map_err(|source| GitError::Io {
            command: rendered.clone(),
            source,
        })?;

        let stdout =
            String::from_utf8(output.stdout).map_err(|source| GitError::NonUtf8Output {
                command: rendered.clone(),
                stream: "stdout",
                source,
            })?;
        let stderr =
            String::from_utf8(output.stderr).map_err(|source| GitError::NonUtf8Output {
                command: rendered.clone(),
                stream: "stderr",
                source,
            })?;

        if !output.status.success() {
            tracing::warn!(command = %rendered, status = ?output.status.code(), "git command failed");
            return Err(GitError::CommandFailed {
                command: rendered,
                status: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(GitOutput { stdout, stderr })
    }
}

fn render_command(binary: &Path, args: &[OsString]) -> String {
    let mut rendered = binary.to_string_lossy().into_owned();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tmp_repo(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "agent-git-command-{}-{}",
            name,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        let git = GitCli::default();
        git.run(&dir, ["init", "-q"]).expect("git init");
        git.run(&dir, ["config", "user.email", "bot@example.com"])
            .expect("config email");
        git.run(&dir, ["config", "user.name", "Bot"])
            .expect("config name");
        dir
    }

    #[test]
    fn run_captures_stdout_on_success() {
        let dir = tmp_repo("run-ok");
        let git = GitCli::default();
        let out = git.run(&dir, ["rev-parse", "--is-inside-work-tree"]).unwrap();
        assert_eq!(out.stdout.trim(), "true");
    }

    #[test]
    fn run_classifies_command_failed() {
        let dir = tmp_repo("run-fail");
        let git = GitCli::default();
        let err = git.run(&dir, ["rev-parse", "refs/does-not-exist"]).unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { .. }));
    }

    #[test]
    fn run_classifies_io_error_for_missing_binary() {
        let dir = tmp_repo("run-io");
        let git = GitCli::new("/definitely/missing/git-binary");
        let err = git.run(&dir, ["status"]).unwrap_err();
        assert!(matches!(err, GitError::Io { .. }));
    }
}
