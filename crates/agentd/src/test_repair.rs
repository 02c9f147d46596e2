//! Test Repairer (C12).
//!
//! Same schema and post-processing laws as C11, but takes the captured
//! failing test output and an iteration number, and includes the failure
//! verbatim in the prompt.

use std::sync::Arc;

use agent_core::{PrContextWithTests, TestProposal};
use agent_llm::StructuredLlmClient;
use serde::Deserialize;
use tracing::warn;

use crate::postprocess::postprocess_test_proposals;
use crate::schema::test_proposals_schema;

#[derive(Debug, Deserialize)]
struct TestProposalsOutput {
    proposals: Vec<TestProposal>,
}

pub async fn repair_tests(
    client: &Arc<dyn StructuredLlmClient>,
    context: &PrContextWithTests,
    test_root: &str,
    failing_output: &str,
    iteration: u32,
) -> Vec<TestProposal> {
    let prompt = build_prompt(context, test_root, failing_output, iteration);

    let value = match client.generate(&test_proposals_schema(), &prompt).await {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, iteration, "test repair LLM call failed, yielding no proposals");
            return Vec::new();
        }
    };

    let proposals = match serde_json::from_value::<TestProposalsOutput>(value) {
        Ok(out) => out.proposals,
        Err(err) => {
            warn!(error = %err, iteration, "test repair output did not match schema, yielding no proposals");
            return Vec::new();
        }
    };

    postprocess_test_proposals(proposals, &context.context.changed_files)
}

fn build_prompt(context: &PrContextWithTests, test_root: &str, failing_output: &str, iteration: u32) -> String {
    let existing: String = context
        .existing_test_files
        .iter()
        .map(|t| format!("{}\n", t.path))
        .collect();

    format!(
        "Repair the failing tests below (repair attempt {iteration}). Proposals \
         must live under `{test_root}` and follow the same naming rule as test \
         generation.\n\n\
         Failing test output:\n{failing_output}\n\n\
         Existing test files:\n{existing}"
    )
}
