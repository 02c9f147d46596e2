//! Version-Control Driver (C4): branch switch/create, stage/commit, and
//! remote-aware push. `ensurePullRequest` is not implemented here — per
//! the design notes it is a thin wrapper over the PR Hosting Client (C18)
//! in `agent-hosting`, not the git CLI.

use std::path::{Path, PathBuf};

use crate::command::GitCli;
use crate::error::GitError;

const REMOTE: &str = "origin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsDriver {
    pub repo_root: PathBuf,
    pub git: GitCli,
}

impl VcsDriver {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            git: GitCli::default(),
        }
    }

    pub fn with_git(repo_root: impl Into<PathBuf>, git: GitCli) -> Self {
        Self {
            repo_root: repo_root.into(),
            git,
        }
    }

    /// Check out `base`, fast-forward it, then check out or create `name`
    /// tracking the remote if it exists there, rebasing onto the remote head.
    pub fn switch_to_branch(&self, base: &str, name: &str) -> Result<(), GitError> {
        self.git.run(&self.repo_root, ["checkout", "-q", base])?;
        // Best-effort fast-forward; a missing remote tracking ref is not fatal here.
        let _ = self
            .git
            .run(&self.repo_root, ["fetch", "-q", REMOTE, base]);
        let _ = self.git.run(
            &self.repo_root,
            ["merge", "-q", "--ff-only", &format!("{REMOTE}/{base}")],
        );

        let remote_refspec = format!("refs/heads/{name}");
        let remote_has_branch = self
            .git
            .run(&self.repo_root, ["ls-remote", "--heads", REMOTE, &remote_refspec])
            .map(|out| !out.stdout.trim().is_empty())
            .unwrap_or(false);

        if remote_has_branch {
            let local_exists = self
                .git
                .run(&self.repo_root, ["rev-parse", "--verify", "-q", name])
                .is_ok();
            if local_exists {
                self.git.run(&self.repo_root, ["checkout", "-q", name])?;
            } else {
                self.git.run(
                    &self.repo_root,
                    ["checkout", "-q", "-b", name, "--track", &format!("{REMOTE}/{name}")],
                )?;
            }
            self.git
                .run(&self.repo_root, ["rebase", "-q", &format!("{REMOTE}/{name}")])?;
        } else {
            self.git.run(&self.repo_root, ["checkout", "-q", "-b", name])?;
        }

        Ok(())
    }

    /// Stage everything (including deletions and new files) and commit.
    /// Calling this with nothing staged is undefined; callers must check
    /// for pending changes first.
    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        self.git.run(&self.repo_root, ["add", "-A"])?;
        self.git
            .run(&self.repo_root, ["commit", "-q", "-m", message])?;
        Ok(())
    }

    /// Whether there are staged or unstaged working-tree changes to commit.
    pub fn has_pending_changes(&self) -> Result<bool, GitError> {
        let output = self
            .git
            .run(&self.repo_root, ["status", "--porcelain=v1"])?;
        Ok(!output.stdout.trim().is_empty())
    }

    /// Push the current branch, fetching + rebasing first if the remote
    /// already has it; otherwise push with upstream set.
    pub fn push(&self, branch: &str) -> Result<(), GitError> {
        let remote_refspec = format!("refs/heads/{branch}");
        let remote_has_branch = self
            .git
            .run(&self.repo_root, ["ls-remote", "--heads", REMOTE, &remote_refspec])
            .map(|out| !out.stdout.trim().is_empty())
            .unwrap_or(false);

        if remote_has_branch {
            self.git
                .run(&self.repo_root, ["fetch", "-q", REMOTE, branch])?;
            self.git
                .run(&self.repo_root, ["rebase", "-q", &format!("{REMOTE}/{branch}")])?;
            self.git.run(&self.repo_root, ["push", "-q", REMOTE, branch])?;
        } else {
            self.git
                .run(&self.repo_root, ["push", "-q", "-u", REMOTE, branch])?;
        }
        Ok(())
    }
}

/// Timestamped branch name policy (recommended default, §9).
pub fn timestamped_branch_name(at: chrono::DateTime<chrono::Utc>) -> String {
    format!("agent/{}", at.format("%Y%m%d_%H%M"))
}

/// Slugified feature-request branch name policy (non-default opt-in, §9).
pub fn slugify_branch_name(feature_request: &str, max_len: usize) -> String {
    let mut slug = String::new();
    let mut last_was_dash = false;
    for ch in feature_request.to_ascii_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash && !slug.is_empty() {
            slug.push('-');
            last_was_dash = true;
        }
    }
    let trimmed = slug.trim_end_matches('-');
    let capped: String = trimmed.chars().take(max_len).collect();
    format!("agent/{}", capped.trim_end_matches('-'))
}
