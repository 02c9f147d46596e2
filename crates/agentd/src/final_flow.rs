//! Final Flow (C14): runs once, after every Step has been processed, over
//! the full `merge_base(base)..HEAD` range.

use std::sync::Arc;

use agent_core::RunConfig;
use agent_git::VcsDriver;
use agent_hosting::{HostingClient, PrNumber, ReviewSurface};
use agent_llm::StructuredLlmClient;
use agent_verify::run_tests;
use tracing::{info, warn};

use crate::context::{attach_existing_tests, build_pr_context};
use crate::disk::write_test_proposals;
use crate::error::OrchestratorError;
use crate::gating::decide;
use crate::reviewer::review;
use crate::test_gen::generate_tests;
use crate::test_repair::repair_tests;

const PLACEHOLDER_REVIEW: &str = "Generating final review…";
const PLACEHOLDER_TESTS: &str = "Evaluating test coverage…";
const FINAL_PR_BODY: &str = "All steps done. PR is ready for final review.";

pub struct FinalFlowOutcome {
    pub tests_passed: bool,
}

pub async fn run_final(
    config: &RunConfig,
    git: &VcsDriver,
    hosting: &HostingClient,
    llm: &Arc<dyn StructuredLlmClient>,
    pr: PrNumber,
    branch_name: &str,
    title: &str,
) -> Result<FinalFlowOutcome, OrchestratorError> {
    let diff = agent_git::full(&git.repo_root, &git.git, &config.base_branch)?;
    let context = build_pr_context(config, branch_name, title, Some(pr.0), diff);
    let test_ctx = attach_existing_tests(context, &git.repo_root, &config.test_root);

    let surface = ReviewSurface::new(hosting);

    let review_comment = surface.create_comment(pr, PLACEHOLDER_REVIEW).await;
    let analysis = review(llm, &test_ctx.context).await;
    match review_comment {
        Ok(id) => surface.update_comment_best_effort(id, &analysis.summary).await,
        Err(err) => warn!(error = %err, "failed to post final placeholder review comment"),
    }

    let test_comment = surface.create_comment(pr, PLACEHOLDER_TESTS).await;
    let gating = decide(llm, &test_ctx, Some(&analysis)).await;

    if gating.should_generate {
        let proposals = generate_tests(llm, &test_ctx, &config.test_root, Some(&analysis.summary)).await;
        if !proposals.is_empty() {
            write_test_proposals(&git.repo_root, &proposals)?;
            git.commit("AI test generation - final pass")?;
            git.push(branch_name)?;
        }
    }

    let command = config.test_command.as_deref().unwrap_or("");
    let mut result = run_tests(command, &git.repo_root)?;
    let mut iteration = 0;

    while result.failed && iteration < config.test_repair_budget {
        iteration += 1;
        let proposals = repair_tests(llm, &test_ctx, &config.test_root, &result.output, iteration).await;
        if proposals.is_empty() {
            break;
        }
        write_test_proposals(&git.repo_root, &proposals)?;
        git.commit(&format!("AI test fix attempt #{iteration}"))?;
        git.push(branch_name)?;
        result = run_tests(command, &git.repo_root)?;
    }

    let tests_passed = !result.failed;
    let test_comment_body = if tests_passed {
        "All tests passing.".to_string()
    } else {
        format!("Tests failing after {} fix attempts.", config.test_repair_budget)
    };

    match test_comment {
        Ok(id) => surface.update_comment_best_effort(id, &test_comment_body).await,
        Err(err) => warn!(error = %err, "failed to post final placeholder test comment"),
    }

    if tests_passed {
        match hosting.update_pull_request_body(pr, FINAL_PR_BODY).await {
            Ok(()) => info!(pr = pr.0, "PR body updated to ready-for-review"),
            Err(err) => warn!(error = %err, "final PR body update failed, continuing (non-fatal)"),
        }
    }

    Ok(FinalFlowOutcome { tests_passed })
}
