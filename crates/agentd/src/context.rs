//! Builds `PrContext`/`PrContextWithTests` values from a `DiffResult` plus
//! run configuration, and implements `attachExistingTests` (§4.13, §4.14):
//! reading every file under the configured test root into
//! `existing_test_files`.

use std::path::Path;

use agent_core::{ExistingTestFile, PrContext, PrContextWithTests, RunConfig};
use agent_git::DiffResult;

pub fn build_pr_context(
    config: &RunConfig,
    head_ref: &str,
    title: &str,
    pull_number: Option<u64>,
    diff: DiffResult,
) -> PrContext {
    PrContext {
        owner: config.owner.clone(),
        repo: config.repo.clone(),
        pull_number,
        head_ref: head_ref.to_string(),
        base_ref: config.base_branch.clone(),
        title: title.to_string(),
        changed_files: diff.changed_files,
        commit_messages: diff.commit_messages,
    }
}

/// `attachExistingTests`: extend a `PrContext` with the contents of every
/// file under `test_root` whose name matches the unit-test naming
/// convention (`*.test.<ext>`).
pub fn attach_existing_tests(context: PrContext, repo_root: &Path, test_root: &str) -> PrContextWithTests {
    let mut existing_test_files = Vec::new();
    collect_test_files(&repo_root.join(test_root), test_root, &mut existing_test_files);
    existing_test_files.sort_by(|a, b| a.path.cmp(&b.path));

    PrContextWithTests {
        context,
        existing_test_files,
    }
}

fn collect_test_files(dir: &Path, rel_prefix: &str, out: &mut Vec<ExistingTestFile>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let rel_path = format!("{rel_prefix}/{file_name}");

        if path.is_dir() {
            collect_test_files(&path, &rel_path, out);
        } else if is_test_file_name(&file_name) {
            if let Ok(content) = std::fs::read_to_string(&path) {
                out.push(ExistingTestFile { path: rel_path, content });
            }
        }
    }
}

fn is_test_file_name(file_name: &str) -> bool {
    [".test.ts", ".test.tsx", ".test.js", ".test.jsx"]
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "agentd-context-{}-{}",
            name,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn base_context() -> PrContext {
        PrContext {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            pull_number: Some(1),
            head_ref: "agent/20260101_0000".to_string(),
            base_ref: "main".to_string(),
            title: "AI PR".to_string(),
            changed_files: vec![],
            commit_messages: vec![],
        }
    }

    #[test]
    fn collects_only_test_named_files_under_the_test_root() {
        let root = tmp("collect");
        std::fs::create_dir_all(root.join("__tests__/unit")).unwrap();
        std::fs::write(root.join("__tests__/unit/Foo.test.tsx"), "a").unwrap();
        std::fs::write(root.join("__tests__/unit/helpers.ts"), "not a test").unwrap();

        let with_tests = attach_existing_tests(base_context(), &root, "__tests__/unit");
        assert_eq!(with_tests.existing_test_files.len(), 1);
        assert_eq!(with_tests.existing_test_files[0].path, "__tests__/unit/Foo.test.tsx");
    }

    #[test]
    fn missing_test_root_yields_empty_list() {
        let root = tmp("missing");
        let with_tests = attach_existing_tests(base_context(), &root, "__tests__/unit");
        assert!(with_tests.existing_test_files.is_empty());
    }
}
