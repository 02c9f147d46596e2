//! Code Reviewer (C9).
//!
//! Input: a `PrContext` (partial or full). Output: a `ReviewAnalysis`, or
//! the fallback analysis on LLM failure. Never throws: the review is
//! advisory, and a parse failure must not abort the pipeline.

use std::sync::Arc;

use agent_core::{PrContext, ReviewAnalysis};
use agent_llm::StructuredLlmClient;
use tracing::warn;

use crate::schema::review_analysis_schema;

pub async fn review(client: &Arc<dyn StructuredLlmClient>, context: &PrContext) -> ReviewAnalysis {
    let prompt = build_prompt(context);

    let value = match client.generate(&review_analysis_schema(), &prompt).await {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, "code review LLM call failed, falling back");
            return ReviewAnalysis::parse_error();
        }
    };

    match serde_json::from_value::<ReviewAnalysis>(value) {
        Ok(analysis) => analysis,
        Err(err) => {
            warn!(error = %err, "code review output did not match schema, falling back");
            ReviewAnalysis::parse_error()
        }
    }
}

fn build_prompt(context: &PrContext) -> String {
    let files: String = context
        .changed_files
        .iter()
        .map(|f| format!("{}\n{}\n\n", f.path, f.raw_patch))
        .collect();

    format!(
        "Review the following pull request changes for \"{}\" ({} -> {}).\n\n\
         Commit messages:\n{}\n\n\
         Changed files:\n{files}\n\n\
         Produce a short overall summary, a per-file analysis, and a list of \
         overall suggestions.",
        context.title,
        context.head_ref,
        context.base_ref,
        context.commit_messages.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn context() -> PrContext {
        PrContext {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            pull_number: Some(1),
            head_ref: "agent/20260101_0000".to_string(),
            base_ref: "main".to_string(),
            title: "AI PR".to_string(),
            changed_files: vec![],
            commit_messages: vec!["Step 1".to_string()],
        }
    }

    #[tokio::test]
    async fn returns_parsed_analysis_on_success() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient {
            result: Ok(serde_json::json!({
                "summary": "looks good",
                "file_analyses": [],
                "overall_suggestions": []
            })),
        });

        let analysis = review(&client, &context()).await;
        assert_eq!(analysis.summary, "looks good");
    }

    #[tokio::test]
    async fn falls_back_on_llm_failure() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient { result: Err(()) });
        let analysis = review(&client, &context()).await;
        assert_eq!(analysis.summary, "Review parse error");
    }

    #[tokio::test]
    async fn falls_back_on_malformed_output() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient {
            result: Ok(serde_json::json!({ "not_a_summary": true })),
        });
        let analysis = review(&client, &context()).await;
        assert_eq!(analysis.summary, "Review parse error");
    }
}
