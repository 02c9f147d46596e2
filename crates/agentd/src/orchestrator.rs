//! Orchestrator (C15): reads configuration, computes the branch name, drives
//! `switchToBranch → Planner → Step(i)… → Final Flow`, and owns the
//! `RunState` state machine.

use std::sync::Arc;

use agent_core::{transition, BranchNamePolicy, RunConfig, RunState};
use agent_git::{slugify_branch_name, timestamped_branch_name, VcsDriver};
use agent_hosting::HostingClient;
use agent_llm::StructuredLlmClient;
use agent_git::snapshot::{capture_snapshot, SnapshotOptions};
use tracing::{error, info, warn};

use crate::error::OrchestratorError;
use crate::final_flow::run_final;
use crate::partial_flow::{run_step, PartialFlowState};
use crate::planner::plan;

/// Frontend-only code rules handed to the Planner and Generator. Fixed for
/// now; promoting this to a `RunConfig` field is unneeded until a second
/// rule set is needed.
const CODE_RULES: &str = "Write idiomatic, typed frontend code. Prefer existing \
     project conventions over introducing new libraries.";

/// Cap on the `slugify_branch_name` policy per §6.
const SLUG_BRANCH_NAME_MAX_LEN: usize = 50;

pub async fn run(
    config: &RunConfig,
    git: &VcsDriver,
    hosting: &HostingClient,
    llm: Arc<dyn StructuredLlmClient>,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<(), OrchestratorError> {
    let mut state = RunState::Init;

    let branch_name = match config.branch_name_policy {
        BranchNamePolicy::Timestamped => timestamped_branch_name(at),
        BranchNamePolicy::SlugifiedFeatureRequest => {
            slugify_branch_name(&config.feature_request, SLUG_BRANCH_NAME_MAX_LEN)
        }
    };
    git.switch_to_branch(&config.base_branch, &branch_name)?;
    info!(branch = %branch_name, "switched to run branch");

    transition(&mut state, RunState::Planning, at)?;

    let snapshot = capture_snapshot(&git.repo_root, &SnapshotOptions::default())?;
    let steps = plan(&llm, &config.feature_request, &snapshot, CODE_RULES).await;

    if steps.len() == 1 && steps[0].is_plan_error() {
        transition(&mut state, RunState::NoPlan, at)?;
        warn!("planner produced no usable plan, exiting without creating a PR");
        return Err(OrchestratorError::NoPlan);
    }

    transition(&mut state, RunState::Step(1), at)?;

    let mut flow_state = PartialFlowState::new();
    for (index, step) in steps.iter().enumerate() {
        let step_number = index as u32 + 1;
        if step_number > 1 {
            transition(&mut state, RunState::Step(step_number), at)?;
        }

        info!(step = %step.name, step_number, "starting step");
        run_step(
            config,
            git,
            hosting,
            &llm,
            &mut flow_state,
            step_number,
            step,
            &snapshot,
            CODE_RULES,
            &branch_name,
        )
        .await?;
    }

    transition(&mut state, RunState::FinalReview, at)?;

    let pr = flow_state.pr_number.ok_or_else(|| {
        error!("no step produced a commit; nothing to finalize");
        OrchestratorError::NoPlan
    })?;

    let outcome = run_final(config, git, hosting, &llm, pr, &branch_name, &config.feature_request).await?;

    if outcome.tests_passed {
        transition(&mut state, RunState::ReadyForReview, at)?;
        info!(pr = pr.0, "run complete, ready for review");
        Ok(())
    } else {
        transition(&mut state, RunState::TestBudgetExhausted, at)?;
        Err(OrchestratorError::TestBudgetExhausted {
            budget: config.test_repair_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_rules_are_non_empty() {
        assert!(!CODE_RULES.is_empty());
    }

    #[test]
    fn slugified_policy_uses_the_configured_length_cap() {
        let name = slugify_branch_name("Add a Contact page!!", SLUG_BRANCH_NAME_MAX_LEN);
        assert!(name.starts_with("agent/"));
        assert!(name.len() <= "agent/".len() + SLUG_BRANCH_NAME_MAX_LEN);
    }
}
