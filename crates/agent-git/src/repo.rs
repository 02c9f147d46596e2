use std::path::{Path, PathBuf};

use crate::command::GitCli;
use crate::error::GitError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHandle {
    pub root: PathBuf,
    pub git_dir: PathBuf,
}

pub fn discover_repo(start_path: &Path, git: &GitCli) -> Result<RepoHandle, GitError> {
    let inside = match git.run(start_path, ["rev-parse", "--is-inside-work-tree"]) {
        Ok(output) => output.stdout.trim().eq("true"),
        Err(GitError::CommandFailed { .. }) => false,
        Err(err) => return Err(err),
    };

    if !inside {
        return Err(GitError::NotARepository {
            path: start_path.to_path_buf(),
        });
    }

    let root_raw = git.run(start_path, ["rev-parse", "--show-toplevel"])?;
    let root = PathBuf::from(root_raw.stdout.trim());

    let git_dir_raw = git.run(&root, ["rev-parse", "--git-dir"])?;
    let git_dir_rel = PathBuf::from(git_dir_raw.stdout.trim());
    let git_dir = if git_dir_rel.is_absolute() {
        git_dir_rel
    } else {
        root.join(git_dir_rel)
    };

    Ok(RepoHandle { root, git_dir })
}

pub fn current_branch(repo: &RepoHandle, git: &GitCli) -> Result<String, GitError> {
    let output = git.run(&repo.root, ["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(output.stdout.trim().to_string())
}

pub fn head_sha(repo: &RepoHandle, git: &GitCli) -> Result<String, GitError> {
    let output = git.run(&repo.root, ["rev-parse", "HEAD"])?;
    Ok(output.stdout.trim().to_string())
}

/// Whether the remote (`origin` by default) has a branch with this name.
pub fn remote_branch_exists(
    repo: &RepoHandle,
    git: &GitCli,
    remote: &str,
    branch: &str,
) -> Result<bool, GitError> {
    let refspec = format!("refs/heads/{branch}");
    let output = git.run(&repo.root, ["ls-remote", "--heads", remote, &refspec])?;
    Ok(!output.stdout.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tmp_repo(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "agent-git-repo-{}-{}",
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
        fs::write(dir.join("README.md"), "hello\n").unwrap();
        git.run(&dir, ["add", "-A"]).unwrap();
        git.run(&dir, ["commit", "-q", "-m", "init"]).unwrap();
        dir
    }

    #[test]
    fn discovers_repo_root_and_git_dir() {
        let dir = tmp_repo("discover");
        let git = GitCli::default();
        let handle = discover_repo(&dir, &git).expect("discover");
        assert_eq!(handle.root, dir.canonicalize().unwrap_or(dir));
    }

    #[test]
    fn rejects_non_repository_path() {
        let dir = std::env::temp_dir().join(format!(
            "agent-git-not-a-repo-{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        fs::create_dir_all(&dir).unwrap();
        let git = GitCli::default();
        let err = discover_repo(&dir, &git).unwrap_err();
        assert!(matches!(err, GitError::NotARepository { .. }));
    }

    #[test]
    fn current_branch_and_head_sha_are_consistent() {
        let dir = tmp_repo("branch");
        let git = GitCli::default();
        let handle = discover_repo(&dir, &git).unwrap();
        let branch = current_branch(&handle, &git).unwrap();
        assert!(!branch.is_empty());
        let sha = head_sha(&handle, &git).unwrap();
        assert_eq!(sha.len(), 40);
    }
}
