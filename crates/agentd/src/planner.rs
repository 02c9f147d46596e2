//! Planner (C7).
//!
//! Turns a feature request plus repository context into an ordered list of
//! [`Step`]s. Never returns an empty list: a schema-validation failure or
//! LLM error collapses to the single sentinel `Step::plan_error()`, which
//! the orchestrator treats as terminal (`RunState::NoPlan`).

use std::sync::Arc;

use agent_core::Step;
use agent_llm::StructuredLlmClient;
use serde::Deserialize;
use tracing::warn;

use crate::schema::plan_schema;

#[derive(Debug, Deserialize)]
struct PlanOutput {
    steps: Vec<Step>,
}

pub async fn plan(
    client: &Arc<dyn StructuredLlmClient>,
    feature_request: &str,
    repo_snapshot: &str,
    code_rules: &str,
) -> Vec<Step> {
    let prompt = build_prompt(feature_request, repo_snapshot, code_rules);

    let value = match client.generate(&plan_schema(), &prompt).await {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, "planner LLM call failed, yielding PlanError");
            return vec![Step::plan_error()];
        }
    };

    match serde_json::from_value::<PlanOutput>(value) {
        Ok(out) if !out.steps.is_empty() => out.steps,
        Ok(_) => {
            warn!("planner returned an empty step list, yielding PlanError");
            vec![Step::plan_error()]
        }
        Err(err) => {
            warn!(error = %err, "planner output did not match the Step schema, yielding PlanError");
            vec![Step::plan_error()]
        }
    }
}

fn build_prompt(feature_request: &str, repo_snapshot: &str, code_rules: &str) -> String {
    format!(
        "You are planning an implementation for the following feature request.\n\n\
         Restrict every step to the frontend layer of this repository: UI \
         components, client-side routing, styling, and frontend state. Do not \
         propose steps that touch backend services, database migrations, or \
         infrastructure.\n\n\
         **Feature request:**\n{feature_request}\n\n\
         **Code rules:**\n{code_rules}\n\n\
         **Repository snapshot:**\n{repo_snapshot}\n\n\
         Produce a non-empty ordered list of implementation steps. Each step \
         must have a short `name`, a one-paragraph `description`, and a `plan` \
         explaining how to implement it."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::LlmError;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct StubClient {
        result: Result<Value, &'static str>,
    }

    #[async_trait]
    impl StructuredLlmClient for StubClient {
        async fn generate(&self, _schema: &Value, _prompt: &str) -> Result<Value, LlmError> {
            match &self.result {
                Ok(v) => Ok(v.clone()),
                Err(msg) => Err(LlmError::EmptyChoices { provider: msg }),
            }
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }
    }

    #[tokio::test]
    async fn returns_parsed_steps_on_success() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient {
            result: Ok(serde_json::json!({
                "steps": [
                    { "name": "Add page", "description": "desc", "plan": "plan" }
                ]
            })),
        });

        let steps = plan(&client, "Add a Contact page", "snapshot", "rules").await;
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].name, "Add page");
    }

    #[tokio::test]
    async fn falls_back_to_plan_error_on_llm_failure() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient {
            result: Err("stub"),
        });

        let steps = plan(&client, "Add a Contact page", "snapshot", "rules").await;
        assert_eq!(steps.len(), 1);
        assert!(steps[0].is_plan_error());
    }

    #[tokio::test]
    async fn falls_back_to_plan_error_on_empty_step_list() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient {
            result: Ok(serde_json::json!({ "steps": [] })),
        });

        let steps = plan(&client, "Add a Contact page", "snapshot", "rules").await;
        assert!(steps[0].is_plan_error());
    }

    #[tokio::test]
    async fn falls_back_to_plan_error_on_malformed_output() {
        let client: Arc<dyn StructuredLlmClient> = Arc::new(StubClient {
            result: Ok(serde_json::json!({ "not_steps": [] })),
        });

        let steps = plan(&client, "Add a Contact page", "snapshot", "rules").await;
        assert!(steps[0].is_plan_error());
    }
}
