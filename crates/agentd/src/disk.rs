//! Writing `FileChange`s and `TestProposal`s to the working tree. Writes
//! are whole-file replacements; a `Rename` proposal additionally removes
//! the file at `old_path`.

use std::path::Path;

use agent_core::{FileChange, TestProposal, TestProposalAction};

use crate::error::OrchestratorError;

pub fn write_file_changes(repo_root: &Path, changes: &[FileChange]) -> Result<(), OrchestratorError> {
    for change in changes {
        write_one(repo_root, &change.path, &change.content)?;
    }
    Ok(())
}

pub fn write_test_proposals(repo_root: &Path, proposals: &[TestProposal]) -> Result<(), OrchestratorError> {
    for proposal in proposals {
        if proposal.action == TestProposalAction::Rename {
            let old = repo_root.join(&proposal.old_path);
            if old.exists() {
                std::fs::remove_file(&old).map_err(|source| OrchestratorError::Io {
                    path: proposal.old_path.clone(),
                    source,
                })?;
            }
        }
        write_one(repo_root, &proposal.path, &proposal.test_content)?;
    }
    Ok(())
}

fn write_one(repo_root: &Path, rel_path: &str, content: &str) -> Result<(), OrchestratorError> {
    let full_path = repo_root.join(rel_path);
    if let Some(parent) = full_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| OrchestratorError::Io {
            path: rel_path.to_string(),
            source,
        })?;
    }
    std::fs::write(&full_path, content).map_err(|source| OrchestratorError::Io {
        path: rel_path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "agentd-disk-{}-{}",
            name,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn writes_nested_file_creating_directories() {
        let root = tmp("nested");
        let changes = vec![FileChange::new("app/contact/page.tsx", "export default function Page() {}")];
        write_file_changes(&root, &changes).unwrap();
        let written = std::fs::read_to_string(root.join("app/contact/page.tsx")).unwrap();
        assert_eq!(written, "export default function Page() {}");
    }

    #[test]
    fn rename_proposal_removes_old_path() {
        let root = tmp("rename");
        std::fs::create_dir_all(root.join("__tests__/unit")).unwrap();
        std::fs::write(root.join("__tests__/unit/Foo.test.ts"), "old").unwrap();

        let proposal = TestProposal {
            path: "__tests__/unit/Foo.test.tsx".to_string(),
            test_content: "new".to_string(),
            action: TestProposalAction::Rename,
            old_path: "__tests__/unit/Foo.test.ts".to_string(),
        };
        write_test_proposals(&root, &[proposal]).unwrap();

        assert!(!root.join("__tests__/unit/Foo.test.ts").exists());
        let written = std::fs::read_to_string(root.join("__tests__/unit/Foo.test.tsx")).unwrap();
        assert_eq!(written, "new");
    }
}
