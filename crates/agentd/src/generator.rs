//! File-Change Generator (C8).
//!
//! Input: one `Step`, the current `AccumulatedChanges` overlay, a repository
//! snapshot, and the code rules. Output: zero or more `FileChange`s. The
//! model sees both the base snapshot and the overlay so it can reason about
//! prior steps' partial state without re-reading disk.

use std::sync::Arc;

use agent_core::{AccumulatedChanges, FileChange, Step};
use agent_llm::StructuredLlmClient;
use serde::Deserialize;
use tracing::warn;

use crate::paths::is_path_allowed;
use crate::schema::file_changes_schema;

#[derive(Debug, Deserialize)]
struct FileChangesOutput {
    changes: Vec<FileChange>,
}

pub async fn generate_file_changes(
    client: &Arc<dyn StructuredLlmClient>,
    step: &Step,
    accumulated: &AccumulatedChanges,
    repo_snapshot: &str,
    code_rules: &str,
    allowed_path_prefixes: &[String],
) -> Vec<FileChange> {
    let prompt = build_prompt(step, accumulated, repo_snapshot, code_rules);

    let value = match client.generate(&file_changes_schema(), &prompt).await {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, step = %step.name, "file-change generation failed, yielding no changes");
            return Vec::new();
        }
    };

    let changes = match serde_json::from_value::<FileChangesOutput>(value) {
        Ok(out) => out.changes,
        Err(err) => {
            warn!(error = %err, step = %step.name, "file-change output did not match schema, yielding no changes");
            return Vec::new();
        }
    };

    let (allowed, rejected): (Vec<_>, Vec<_>) = changes
        .into_iter()
        .partition(|c| is_path_allowed(&c.path, allowed_path_prefixes));

    for change in &rejected {
        warn!(path = %change.path, "file-change generator proposed a path outside the allowed prefixes, dropping it");
    }

    allowed
}

fn build_prompt(
    step: &Step,
    accumulated: &AccumulatedChanges,
    repo_snapshot: &str,
    code_rules: &str,
) -> String {
    let overlay: String = accumulated
        .iter()
        .map(|c| format!("{}\n---\n{}\n\n", c.path, c.content))
        .collect();

    format!(
        "Implement the following step. Emit the complete post-change content \
         for every file you touch; writes replace the whole file, not a diff.\n\n\
         **Step:** {}\n**Description:** {}\n**Plan:** {}\n\n\
         **Code rules:**\n{code_rules}\n\n\
         **Changes already made by prior steps in this run (overlay on top of \
         the base snapshot below):**\n{overlay}\n\n\
         **Base repository snapshot:**\n{repo_snapshot}\n\n\
         If this step requires no code changes, return an empty `changes` list.",
        step.name, step.description, step.plan
    )
}
