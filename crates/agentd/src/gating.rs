//! Test Gating (C10).
//!
//! Input: `PrContextWithTests` plus an optional `ReviewAnalysis`. Output: a
//! `GatingDecision`. Policy, enforced in the prompt: any new behavior not
//! covered by an existing test ⇒ `should_generate=true`; pure-style changes
//! ⇒ `false`. LLM failure defaults to `false` with reason `"Gating error"`.

use std::sync::Arc;

use agent_core::{GatingDecision, PrContextWithTests, ReviewAnalysis};
use agent_llm::StructuredLlmClient;
use tracing::warn;

use crate::schema::gating_decision_schema;

pub async fn decide(
    client: &Arc<dyn StructuredLlmClient>,
    context: &PrContextWithTests,
    review: Option<&ReviewAnalysis>,
) -> GatingDecision {
    let prompt = build_prompt(context, review);

    let value = match client.generate(&gating_decision_schema(), &prompt).await {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, "test gating LLM call failed, defaulting to should_generate=false");
            return GatingDecision::gating_error();
        }
    };

    match serde_json::from_value::<GatingDecision>(value) {
        Ok(decision) => decision,
        Err(err) => {
            warn!(error = %err, "test gating output did not match schema, defaulting to should_generate=false");
            GatingDecision::gating_error()
        }
    }
}

fn build_prompt(context: &PrContextWithTests, review: Option<&ReviewAnalysis>) -> String {
    let existing_tests: String = context
        .existing_test_files
        .iter()
        .map(|t| format!("{}\n", t.path))
        .collect();

    let review_summary = review.map(|r| r.summary.as_str()).unwrap_or("(no review available)");

    format!(
        "Decide whether this change requires new or updated tests.\n\n\
         Policy: any new behavior not covered by an existing test should be \
         generated (`should_generate=true`). Pure style/formatting changes \
         should not (`should_generate=false`).\n\n\
         Review summary: {review_summary}\n\n\
         Existing test files covering this area:\n{existing_tests}\n\n\
         Changed files:\n{}",
        context
            .context
            .changed_files
            .iter()
            .map(|f| f.path.clone())
            .collect::<Vec<_>>()
            .join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::PrContext;
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
                changed_files: vec![],
                commit_messages: vec!["Step 1".to_string()],
            },
            existing_test_files: vec![],
        }
    }

    #[tokio::test]
    async fn returns_parsed_decision_on_success() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient {
            result: Ok(serde_json::json!({
                "should_generate": true,
                "reasoning": "new component is untested",
                "recommendation": "add a render test"
            })),
        });

        let decision = decide(&client, &context(), None).await;
        assert!(decision.should_generate);
    }

    #[tokio::test]
    async fn defaults_to_false_on_llm_failure() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient { result: Err(()) });
        let decision = decide(&client, &context(), None).await;
        assert!(!decision.should_generate);
        assert_eq!(decision.reasoning, "Gating error");
    }
}
