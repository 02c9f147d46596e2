//! Diff Extractor (C2).
//!
//! Two operations, `partial()` and `full(base)`, each producing a list of
//! [`FileDiff`] records plus the commit messages in range. Patch text is
//! preserved verbatim; both operations ask git for effectively unlimited
//! unified context so each touched file appears in full.

use agent_core::FileDiff;

use crate::command::GitCli;
use crate::error::GitError;
use std::path::Path;

/// The sentinel commit message used when `partial()` is called on a HEAD
/// with no parent.
pub const NO_PARENT_SENTINEL: &str = "(initial commit, no parent to diff against)";

const UNIFIED_CONTEXT: &str = "-U1000000";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffResult {
    pub changed_files: Vec<FileDiff>,
    pub commit_messages: Vec<String>,
}

/// `partial()` — the patch for `HEAD~1..HEAD`, or an empty result with a
/// sentinel message if HEAD has no parent.
pub fn partial(repo_root: &Path, git: &GitCli) -> Result<DiffResult, GitError> {
    let has_parent = git
        .run(repo_root, ["rev-parse", "--verify", "-q", "HEAD~1"])
        .is_ok();

    if !has_parent {
        return Ok(DiffResult {
            changed_files: Vec::new(),
            commit_messages: vec![NO_PARENT_SENTINEL.to_string()],
        });
    }

    let diff_output = git.run(repo_root, [UNIFIED_CONTEXT, "diff", "HEAD~1", "HEAD"])?;
    let message_output = git.run(repo_root, ["log", "-1", "--format=%B", "HEAD"])?;

    Ok(DiffResult {
        changed_files: parse_unified_diff(&diff_output.stdout),
        commit_messages: vec![message_output.stdout.trim_end().to_string()],
    })
}

/// `full(base)` — the patch for `merge_base(HEAD, base)..HEAD`, falling back
/// to an empty diff against HEAD itself if no merge-base can be resolved.
pub fn full(repo_root: &Path, git: &GitCli, base: &str) -> Result<DiffResult, GitError> {
    let merge_base = git
        .run(repo_root, ["merge-base", "HEAD", base])
        .map(|out| out.stdout.trim().to_string())
        .unwrap_or_else(|_| "HEAD".to_string());

    let range = format!("{merge_base}..HEAD");

    if merge_base == "HEAD" {
        return Ok(DiffResult {
            changed_files: Vec::new(),
            commit_messages: Vec::new(),
        });
    }

    let diff_output = git.run(repo_root, [UNIFIED_CONTEXT, "diff", &merge_base, "HEAD"])?;
    let log_output = git.run(
        repo_root,
        ["log", &range, "--format=%s%n%b%n===AGENT-COMMIT-SEP==="],
    )?;

    let commit_messages = log_output
        .stdout
        .split("===AGENT-COMMIT-SEP===")
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect();

    Ok(DiffResult {
        changed_files: parse_unified_diff(&diff_output.stdout),
        commit_messages,
    })
}

/// Split a unified diff on per-file `diff --git` headers and extract the
/// post-image path from each file's header block. Patch text (the `diff
/// --git` line onward, up to the next header) is preserved verbatim.
pub fn parse_unified_diff(raw: &str) -> Vec<FileDiff> {
    let mut out = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some((path, lines)) = current.take() {
                out.push(finish_file_diff(path, lines));
            }
            if let Some(path) = extract_post_image_path(rest) {
                current = Some((path, vec![line]));
            } else {
                current = None;
            }
            continue;
        }

        if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((path, lines)) = current.take() {
        out.push(finish_file_diff(path, lines));
    }

    out
}

fn finish_file_diff(path: String, lines: Vec<&str>) -> FileDiff {
    let raw_patch = lines.join("\n");
    let (additions, deletions) = count_changes(&lines);
    FileDiff {
        path,
        raw_patch,
        status: None,
        additions: Some(additions),
        deletions: Some(deletions),
        content: None,
        excluded: false,
    }
}

fn count_changes(lines: &[&str]) -> (u32, u32) {
    let mut additions = 0;
    let mut deletions = 0;
    for line in lines {
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        }
        if line.starts_with('+') {
            additions += 1;
        } else if line.starts_with('-') {
            deletions += 1;
        }
    }
    (additions, deletions)
}

/// `diff --git a/foo b/bar` → `bar`. Handles renames where `a/` and `b/`
/// differ, always preferring the post-image (`b/`) path.
fn extract_post_image_path(rest: &str) -> Option<String> {
    let b_marker = " b/";
    let idx = rest.rfind(b_marker)?;
    Some(rest[idx + b_marker.len()..].trim().to_string())
}
