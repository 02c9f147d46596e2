//! Core data model shared by every component of the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One planner-produced unit of work. Immutable once produced by the Planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub description: String,
    pub plan: String,
}

impl Step {
    pub fn new(name: impl Into<String>, description: impl Into<String>, plan: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            plan: plan.into(),
        }
    }

    /// The sentinel step yielded when the Planner cannot produce a valid plan.
    pub fn plan_error() -> Self {
        Self {
            name: "PlanError".to_string(),
            description: "the planner failed to produce a valid plan".to_string(),
            plan: String::new(),
        }
    }

    pub fn is_plan_error(&self) -> bool {
        self.name == "PlanError"
    }
}

/// Full post-state of one file. Writes are replace-in-full; no patch arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub content: String,
}

impl FileChange {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Ordered, path-unique ledger of file changes with last-write-wins semantics.
///
/// Invariant: at most one entry per path; iteration order reflects last touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulatedChanges {
    order: Vec<String>,
    by_path: HashMap<String, FileChange>,
}

impl AccumulatedChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change, overwriting any prior entry for the same path and
    /// moving it to the end of the iteration order.
    pub fn record(&mut self, change: FileChange) {
        if self.by_path.remove(&change.path).is_some() {
            self.order.retain(|p| p != &change.path);
        }
        self.order.push(change.path.clone());
        self.by_path.insert(change.path.clone(), change);
    }

    pub fn record_all(&mut self, changes: impl IntoIterator<Item = FileChange>) {
        for change in changes {
            self.record(change);
        }
    }

    pub fn get(&self, path: &str) -> Option<&FileChange> {
        self.by_path.get(path)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate entries in last-touched order.
    pub fn iter(&self) -> impl Iterator<Item = &FileChange> {
        self.order.iter().map(move |p| &self.by_path[p])
    }
}

/// One element of a diff, produced by splitting a unified patch on per-file headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    pub raw_patch: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub additions: Option<u32>,
    #[serde(default)]
    pub deletions: Option<u32>,
    #[serde(default)]
    pub content: Option<String>,
    /// Set when a path is deliberately hidden from prompts (e.g. oversized or binary).
    #[serde(default)]
    pub excluded: bool,
}

/// Per-run pipeline record. Built fresh for each review pass — never cached
/// across commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrContext {
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub pull_number: Option<u64>,
    pub head_ref: String,
    pub base_ref: String,
    pub title: String,
    pub changed_files: Vec<FileDiff>,
    pub commit_messages: Vec<String>,
}

/// A single test file's existing content, used to populate `existing_test_files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingTestFile {
    pub path: String,
    pub content: String,
}

/// Extends [`PrContext`] with the existing test files under the configured test root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrContextWithTests {
    #[serde(flatten)]
    pub context: PrContext,
    pub existing_test_files: Vec<ExistingTestFile>,
}

/// Per-file review note produced by the Code Reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub path: String,
    pub analysis: String,
}

/// Output of the Code Reviewer (C9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReviewAnalysis {
    pub summary: String,
    pub file_analyses: Vec<FileAnalysis>,
    pub overall_suggestions: Vec<String>,
}

impl ReviewAnalysis {
    /// The fallback analysis returned when C9's LLM call fails. Never throws.
    pub fn parse_error() -> Self {
        Self {
            summary: "Review parse error".to_string(),
            file_analyses: Vec::new(),
            overall_suggestions: Vec::new(),
        }
    }
}

/// What a [`TestProposal`] should do on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestProposalAction {
    Create,
    Update,
    Rename,
}

/// A proposed new/updated/renamed test file, produced by C11/C12.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestProposal {
    pub path: String,
    pub test_content: String,
    pub action: TestProposalAction,
    #[serde(default)]
    pub old_path: String,
}

impl TestProposal {
    /// Invariant check: if `action == Rename`, `old_path` must be non-empty
    /// and differ from `path`; otherwise `old_path` is ignored.
    pub fn is_valid(&self) -> bool {
        if self.action == TestProposalAction::Rename {
            !self.old_path.is_empty() && self.old_path != self.path
        } else {
            true
        }
    }
}

/// Output of the Test Gating component (C10).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatingDecision {
    pub should_generate: bool,
    pub reasoning: String,
    pub recommendation: String,
}

impl GatingDecision {
    /// The fallback decision returned when C10's LLM call fails.
    pub fn gating_error() -> Self {
        Self {
            should_generate: false,
            reasoning: "Gating error".to_string(),
            recommendation: String::new(),
        }
    }
}

/// Implicit per-process record tracked by the Orchestrator (C15).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunRecord {
    pub branch_name: String,
    pub pr_number: Option<u64>,
    pub accumulated: Vec<FileChange>,
    pub review_comment_ids: Vec<u64>,
    pub test_comment_ids: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulated_changes_last_write_wins() {
        let mut acc = AccumulatedChanges::new();
        acc.record(FileChange::new("a.txt", "first"));
        acc.record(FileChange::new("b.txt", "b"));
        acc.record(FileChange::new("a.txt", "second"));

        assert_eq!(acc.len(), 2);
        assert_eq!(acc.get("a.txt").unwrap().content, "second");

        let paths: Vec<&str> = acc.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["b.txt", "a.txt"]);
    }

    #[test]
    fn accumulated_changes_record_all_preserves_last_write_wins() {
        let mut acc = AccumulatedChanges::new();
        acc.record_all(vec![
            FileChange::new("x.txt", "1"),
            FileChange::new("y.txt", "1"),
            FileChange::new("x.txt", "2"),
        ]);
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.get("x.txt").unwrap().content, "2");
    }

    #[test]
    fn plan_error_step_is_recognized() {
        let step = Step::plan_error();
        assert!(step.is_plan_error());
        assert!(!Step::new("Add page", "desc", "plan").is_plan_error());
    }

    #[test]
    fn test_proposal_rename_requires_distinct_old_path() {
        let valid = TestProposal {
            path: "Foo.test.tsx".to_string(),
            test_content: String::new(),
            action: TestProposalAction::Rename,
            old_path: "Foo.test.ts".to_string(),
        };
        assert!(valid.is_valid());

        let invalid = TestProposal {
            path: "Foo.test.tsx".to_string(),
            test_content: String::new(),
            action: TestProposalAction::Rename,
            old_path: String::new(),
        };
        assert!(!invalid.is_valid());

        let same_path = TestProposal {
            path: "Foo.test.tsx".to_string(),
            test_content: String::new(),
            action: TestProposalAction::Rename,
            old_path: "Foo.test.tsx".to_string(),
        };
        assert!(!same_path.is_valid());
    }

    #[test]
    fn review_analysis_parse_error_is_empty_but_summarized() {
        let analysis = ReviewAnalysis::parse_error();
        assert_eq!(analysis.summary, "Review parse error");
        assert!(analysis.file_analyses.is_empty());
        assert!(analysis.overall_suggestions.is_empty());
    }

    #[test]
    fn gating_decision_error_defaults_to_false() {
        let decision = GatingDecision::gating_error();
        assert!(!decision.should_generate);
        assert_eq!(decision.reasoning, "Gating error");
    }

    #[test]
    fn pr_context_with_tests_serde_roundtrip() {
        let ctx = PrContextWithTests {
            context: PrContext {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
                pull_number: Some(7),
                head_ref: "agent/20260101_0000".to_string(),
                base_ref: "main".to_string(),
                title: "AI PR".to_string(),
                changed_files: vec![],
                commit_messages: vec!["Step 1: add page".to_string()],
            },
            existing_test_files: vec![ExistingTestFile {
                path: "__tests__/unit/Foo.test.tsx".to_string(),
                content: "describe".to_string(),
            }],
        };
        let json = serde_json::to_string(&ctx).unwrap();
        let back: PrContextWithTests = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }
}
