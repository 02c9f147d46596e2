//! Entry point: assembles `RunConfig` (C16), installs the logger (C17), and
//! drives the Orchestrator (C15) to completion, mapping its result to the
//! process exit code described in §6.

mod context;
mod disk;
mod error;
mod final_flow;
mod gating;
mod generator;
mod orchestrator;
mod partial_flow;
mod paths;
mod planner;
mod postprocess;
mod reviewer;
mod schema;
mod test_gen;
mod test_repair;

use std::process::ExitCode;

use agent_core::RunConfig;
use agent_git::{discover_repo, GitCli, VcsDriver};
use agent_hosting::{HostingClient, HostingConfig};
use agent_llm::default_client_for;
use chrono::Utc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match RunConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "invalid run configuration");
            return ExitCode::FAILURE;
        }
    };

    let git_cli = GitCli::default();
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            error!(error = %err, "could not read the current working directory");
            return ExitCode::FAILURE;
        }
    };
    let repo = match discover_repo(&cwd, &git_cli) {
        Ok(repo) => repo,
        Err(err) => {
            error!(error = %err, "the working directory is not a git repository");
            return ExitCode::FAILURE;
        }
    };
    let git = VcsDriver::with_git(repo.root, git_cli);

    let hosting = match HostingClient::new(HostingConfig::new(
        config.hosting_token.clone(),
        config.owner.clone(),
        config.repo.clone(),
    )) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "failed to construct the hosting client");
            return ExitCode::FAILURE;
        }
    };

    let llm = match default_client_for(config.llm_provider, config.llm_api_key.clone(), config.llm_model.clone()) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "failed to construct the LLM client");
            return ExitCode::FAILURE;
        }
    };

    match orchestrator::run(&config, &git, &hosting, llm, Utc::now()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ error::OrchestratorError::NoPlan) => {
            error!(error = %err, "no plan produced, exiting without a PR");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "orchestrator aborted");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
