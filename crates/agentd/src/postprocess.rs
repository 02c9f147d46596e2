//! Shared post-processing laws for C11 (Test Generator) and C12 (Test
//! Repairer) output (§4.11). Both components produce `TestProposal` lists
//! under the identical schema, and both are subject to the identical two
//! laws here, applied in a fixed order: extension correctness first (it can
//! change which base name a proposal belongs to), deduplication second.

use std::collections::HashMap;

use agent_core::{FileDiff, TestProposal};

use crate::paths::{base_name, desired_test_extension, extension_of, file_stem, touches_markup, with_extension};

pub fn postprocess_test_proposals(
    proposals: Vec<TestProposal>,
    changed_files: &[FileDiff],
) -> Vec<TestProposal> {
    let corrected: Vec<TestProposal> = proposals
        .into_iter()
        .filter(|p| p.is_valid())
        .map(|p| correct_extension(p, changed_files))
        .collect();

    dedupe_by_base_name(corrected)
}

/// Law 1: extension correctness. If the proposal's subject appears among
/// the changed files and is (or imports) markup, force the markup test
/// extension; otherwise force the plain one. Proposals whose subject has no
/// match in the diff are left as the model proposed them.
fn correct_extension(mut proposal: TestProposal, changed_files: &[FileDiff]) -> TestProposal {
    let subject = base_name(&proposal.path);
    let Some(source) = changed_files.iter().find(|f| file_stem(&f.path) == subject) else {
        return proposal;
    };

    let is_markup = touches_markup(&source.path, source.content.as_deref().unwrap_or(""));
    let current_ext = extension_of(&proposal.path).unwrap_or_default();
    let desired_ext = desired_test_extension(is_markup, &current_ext);

    if desired_ext != current_ext {
        proposal.path = with_extension(&proposal.path, desired_ext);
    }
    proposal
}

/// Law 2: deduplication. At most one proposal survives per base name; if
/// both a markup and a plain extension are proposed for the same subject,
/// the markup one wins.
fn dedupe_by_base_name(proposals: Vec<TestProposal>) -> Vec<TestProposal> {
    let mut order: Vec<String> = Vec::new();
    let mut winners: HashMap<String, TestProposal> = HashMap::new();

    for proposal in proposals {
        let key = base_name(&proposal.path);
        match winners.get(&key) {
            None => {
                order.push(key.clone());
                winners.insert(key, proposal);
            }
            Some(existing) => {
                if should_replace(existing, &proposal) {
                    winners.insert(key, proposal);
                }
            }
        }
    }

    order.into_iter().map(|key| winners.remove(&key).unwrap()).collect()
}

fn should_replace(existing: &TestProposal, candidate: &TestProposal) -> bool {
    let existing_markup = extension_of(&existing.path)
        .map(|ext| ext == "tsx" || ext == "jsx")
        .unwrap_or(false);
    let candidate_markup = extension_of(&candidate.path)
        .map(|ext| ext == "tsx" || ext == "jsx")
        .unwrap_or(false);
    candidate_markup && !existing_markup
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::TestProposalAction;

    fn proposal(path: &str) -> TestProposal {
        TestProposal {
            path: path.to_string(),
            test_content: "test".to_string(),
            action: TestProposalAction::Create,
            old_path: String::new(),
        }
    }

    fn changed_file(path: &str, content: &str) -> FileDiff {
        FileDiff {
            path: path.to_string(),
            raw_patch: String::new(),
            status: None,
            additions: None,
            deletions: None,
            content: Some(content.to_string()),
            excluded: false,
        }
    }

    #[test]
    fn forces_markup_extension_for_markup_subject() {
        let proposals = vec![proposal("__tests__/Foo.test.ts")];
        let changed = vec![changed_file("src/Foo.tsx", "")];
        let result = postprocess_test_proposals(proposals, &changed);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path, "__tests__/Foo.test.tsx");
    }

    #[test]
    fn forces_plain_extension_for_non_markup_subject() {
        let proposals = vec![proposal("__tests__/useFoo.test.tsx")];
        let changed = vec![changed_file("src/useFoo.ts", "plain hook, no markup")];
        let result = postprocess_test_proposals(proposals, &changed);
        assert_eq!(result[0].path, "__tests__/useFoo.test.ts");
    }

    #[test]
    fn leaves_unmatched_subjects_untouched() {
        let proposals = vec![proposal("__tests__/Orphan.test.ts")];
        let result = postprocess_test_proposals(proposals, &[]);
        assert_eq!(result[0].path, "__tests__/Orphan.test.ts");
    }

    #[test]
    fn dedupes_by_base_name_preferring_markup() {
        let proposals = vec![
            proposal("__tests__/Foo.test.ts"),
            proposal("__tests__/Foo.test.tsx"),
        ];
        let result = postprocess_test_proposals(proposals, &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path, "__tests__/Foo.test.tsx");
    }

    #[test]
    fn dedupe_preserves_first_seen_order_across_distinct_subjects() {
        let proposals = vec![
            proposal("__tests__/Bar.test.ts"),
            proposal("__tests__/Foo.test.ts"),
            proposal("__tests__/Bar.test.tsx"),
        ];
        let result = postprocess_test_proposals(proposals, &[]);
        let paths: Vec<&str> = result.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["__tests__/Bar.test.tsx", "__tests__/Foo.test.ts"]);
    }

    #[test]
    fn drops_invalid_rename_proposals() {
        let invalid = TestProposal {
            path: "__tests__/Foo.test.ts".to_string(),
            test_content: String::new(),
            action: TestProposalAction::Rename,
            old_path: String::new(),
        };
        let result = postprocess_test_proposals(vec![invalid], &[]);
        assert!(result.is_empty());
    }
}
