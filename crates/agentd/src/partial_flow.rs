//! Partial-Step Flow (C13): what happens after each Step's file changes are
//! generated — write, commit, push, open/reuse the PR, post a review, and
//! (in the `review_plus_tests` variant) run gated test generation and a
//! bounded repair loop.

use std::sync::Arc;

use agent_core::{AccumulatedChanges, PartialFlowVariant, RunConfig, Step};
use agent_git::VcsDriver;
use agent_hosting::{ensure_pull_request, HostingClient, PrNumber, ReviewSurface};
use agent_llm::StructuredLlmClient;
use agent_verify::run_tests;
use tracing::{info, warn};

use crate::context::{attach_existing_tests, build_pr_context};
use crate::disk::{write_file_changes, write_test_proposals};
use crate::error::OrchestratorError;
use crate::generator::generate_file_changes;
use crate::gating::decide;
use crate::reviewer::review;
use crate::test_gen::generate_tests;
use crate::test_repair::repair_tests;

/// Carries the state that accumulates across steps and must be threaded
/// from one `run_step` call to the next.
pub struct PartialFlowState {
    pub accumulated: AccumulatedChanges,
    pub pr_number: Option<PrNumber>,
}

impl PartialFlowState {
    pub fn new() -> Self {
        Self {
            accumulated: AccumulatedChanges::new(),
            pr_number: None,
        }
    }
}

const INITIAL_PR_BODY_TEMPLATE: &str = "This is an AI-generated PR for feature: \"{feature}\"";
const PLACEHOLDER_REVIEW: &str = "Generating review…";

#[allow(clippy::too_many_arguments)]
pub async fn run_step(
    config: &RunConfig,
    git: &VcsDriver,
    hosting: &HostingClient,
    llm: &Arc<dyn StructuredLlmClient>,
    state: &mut PartialFlowState,
    step_index: u32,
    step: &Step,
    repo_snapshot: &str,
    code_rules: &str,
    branch_name: &str,
) -> Result<(), OrchestratorError> {
    let changes = generate_file_changes(
        llm,
        step,
        &state.accumulated,
        repo_snapshot,
        code_rules,
        &config.allowed_path_prefixes,
    )
    .await;

    if changes.is_empty() {
        info!(step = %step.name, step_index, "step produced no file changes, advancing without a commit");
        return Ok(());
    }

    write_file_changes(&git.repo_root, &changes)?;
    state.accumulated.record_all(changes);

    git.commit(&format!("Step {step_index}: {}", step.name))?;
    git.push(branch_name)?;

    if state.pr_number.is_none() {
        let body = INITIAL_PR_BODY_TEMPLATE.replace("{feature}", &config.feature_request);
        let pr = ensure_pull_request(hosting, branch_name, &config.base_branch, &step.name, &body).await?;
        info!(pr = pr.0, "pull request opened");
        state.pr_number = Some(pr);
    }
    let pr = state.pr_number.expect("set above");

    let diff = agent_git::partial(&git.repo_root, &git.git)?;
    let context = build_pr_context(config, branch_name, &step.name, Some(pr.0), diff);
    let test_ctx = attach_existing_tests(context, &git.repo_root, &config.test_root);

    let surface = ReviewSurface::new(hosting);
    let review_comment = surface.create_comment(pr, PLACEHOLDER_REVIEW).await;
    let analysis = review(llm, &test_ctx.context).await;

    match review_comment {
        Ok(comment_id) => surface.update_comment_best_effort(comment_id, &analysis.summary).await,
        Err(err) => warn!(error = %err, "failed to post placeholder review comment, continuing"),
    }

    if config.partial_flow_variant == PartialFlowVariant::ReviewOnly {
        return Ok(());
    }

    run_gated_tests(config, git, llm, &test_ctx, branch_name, Some(&analysis.summary)).await
}

/// The `review_plus_tests` tail: gating, generation, and a bounded repair loop.
async fn run_gated_tests(
    config: &RunConfig,
    git: &VcsDriver,
    llm: &Arc<dyn StructuredLlmClient>,
    test_ctx: &agent_core::PrContextWithTests,
    branch_name: &str,
    review_summary: Option<&str>,
) -> Result<(), OrchestratorError> {
    let gating = decide(llm, test_ctx, None).await;
    if !gating.should_generate {
        info!(reason = %gating.reasoning, "test gating declined to generate tests for this step");
        return Ok(());
    }

    let proposals = generate_tests(llm, test_ctx, &config.test_root, review_summary).await;
    if proposals.is_empty() {
        return Ok(());
    }

    write_test_proposals(&git.repo_root, &proposals)?;
    git.commit("AI test generation - final pass")?;
    git.push(branch_name)?;

    repair_until_passing_or_exhausted(config, git, llm, test_ctx, branch_name).await
}

async fn repair_until_passing_or_exhausted(
    config: &RunConfig,
    git: &VcsDriver,
    llm: &Arc<dyn StructuredLlmClient>,
    test_ctx: &agent_core::PrContextWithTests,
    branch_name: &str,
) -> Result<(), OrchestratorError> {
    let command = config.test_command.as_deref().unwrap_or("");
    let mut result = run_tests(command, &git.repo_root)?;

    let mut iteration = 0;
    while result.failed && iteration < config.test_repair_budget {
        iteration += 1;
        let proposals = repair_tests(llm, test_ctx, &config.test_root, &result.output, iteration).await;
        if proposals.is_empty() {
            break;
        }
        write_test_proposals(&git.repo_root, &proposals)?;
        git.commit(&format!("AI test fix attempt #{iteration}"))?;
        git.push(branch_name)?;
        result = run_tests(command, &git.repo_root)?;
    }

    if result.failed {
        return Err(OrchestratorError::TestBudgetExhausted {
            budget: config.test_repair_budget,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_pr_and_no_changes() {
        let state = PartialFlowState::new();
        assert!(state.pr_number.is_none());
        assert!(state.accumulated.is_empty());
    }

    #[test]
    fn initial_pr_body_interpolates_feature_request() {
        let body = INITIAL_PR_BODY_TEMPLATE.replace("{feature}", "Add a Contact page");
        assert_eq!(body, "This is an AI-generated PR for feature: \"Add a Contact page\"");
    }
}
