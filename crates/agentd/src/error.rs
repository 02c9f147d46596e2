//! Top-level error taxonomy (§7). Every component error is wrapped here so
//! the orchestrator has one `Result` shape to propagate up to `main`.

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Config(#[from] agent_core::ConfigError),
    #[error(transparent)]
    Git(#[from] agent_git::GitError),
    #[error(transparent)]
    Hosting(#[from] agent_hosting::HostingError),
    #[error(transparent)]
    Llm(#[from] agent_llm::LlmError),
    #[error(transparent)]
    Verify(#[from] agent_verify::VerifyError),
    #[error(transparent)]
    Snapshot(#[from] agent_git::SnapshotError),
    #[error(transparent)]
    State(#[from] agent_core::StateMachineError),
    #[error("the planner produced PlanError; aborting the run")]
    NoPlan,
    #[error("test repair budget of {budget} exhausted without a passing run")]
    TestBudgetExhausted { budget: u32 },
    #[error("failed to write file change to disk: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
