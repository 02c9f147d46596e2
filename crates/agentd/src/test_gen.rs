//! Test Generator (C11).
//!
//! Input: `PrContextWithTests`, optional review summary. Output: a list of
//! `TestProposal`s, restricted to the designated test root and obeying the
//! naming rule, after the shared post-processing laws in [`crate::postprocess`].

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

pub async fn generate_tests(
    client: &Arc<dyn StructuredLlmClient>,
    context: &PrContextWithTests,
    test_root: &str,
    review_summary: Option<&str>,
) -> Vec<TestProposal> {
    let prompt = build_prompt(context, test_root, review_summary);

    let value = match client.generate(&test_proposals_schema(), &prompt).await {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, "test generation LLM call failed, yielding no proposals");
            return Vec::new();
        }
    };

    let proposals = match serde_json::from_value::<TestProposalsOutput>(value) {
        Ok(out) => out.proposals,
        Err(err) => {
            warn!(error = %err, "test generation output did not match schema, yielding no proposals");
            return Vec::new();
        }
    };

    postprocess_test_proposals(proposals, &context.context.changed_files)
}

fn build_prompt(context: &PrContextWithTests, test_root: &str, review_summary: Option<&str>) -> String {
    let existing: String = context
        .existing_test_files
        .iter()
        .map(|t| format!("{}\n", t.path))
        .collect();

    let changed: String = context
        .context
        .changed_files
        .iter()
        .map(|f| format!("{}\n{}\n\n", f.path, f.raw_patch))
        .collect();

    format!(
        "Generate or update tests for the following change. Proposals must \
         live under `{test_root}` and be named `*.test.<ext>` for plain code \
         or `*.test.<jsx-ext>` for markup-bearing code.\n\n\
         Review summary: {}\n\n\
         Existing test files:\n{existing}\n\n\
         Changed files:\n{changed}",
        review_summary.unwrap_or("(no review available)")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{FileDiff, PrContext};
    use agent_llm::LlmError;
    use async_trait::async_trait;
    use serde_json::Value;

    struct StubClient {
        result: Result<Value, ()>,
    }

    #[async_trait]
    impl StructuredLlmClient for StubClient {
        async fn generate(&self, _schema: &Value, _prompt: &str) -> Result<Value, LlmError> {
            self.result
                .clone()
                .map_err(|_| LlmError::EmptyChoices { provider: "stub" })
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }
    }

    fn context() -> PrContextWithTests {
        PrContextWithTests {
            context: PrContext {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
                pull_number: Some(1),
                head_ref: "agent/20260101_0000".to_string(),
                base_ref: "main".to_string(),
                title: "AI PR".to_string(),
                changed_files: vec![FileDiff {
                    path: "src/Foo.tsx".to_string(),
                    raw_patch: String::new(),
                    status: None,
                    additions: None,
                    deletions: None,
                    content: Some(String::new()),
                    excluded: false,
                }],
                commit_messages: vec!["Step 1".to_string()],
            },
            existing_test_files: vec![],
        }
    }

    #[tokio::test]
    async fn applies_postprocessing_to_generated_proposals() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient {
            result: Ok(serde_json::json!({
                "proposals": [
                    { "path": "__tests__/Foo.test.ts", "test_content": "x", "action": "create" }
                ]
            })),
        });

        let proposals = generate_tests(&client, &context(), "__tests__", None).await;
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].path, "__tests__/Foo.test.tsx");
    }

    #[tokio::test]
    async fn llm_failure_yields_no_proposals() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient { result: Err(()) });
        let proposals = generate_tests(&client, &context(), "__tests__", None).await;
        assert!(proposals.is_empty());
    }
}
