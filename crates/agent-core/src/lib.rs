pub mod config;
pub mod state;
pub mod types;

pub use config::{BranchNamePolicy, ConfigError, LlmProvider, PartialFlowVariant, RunConfig};
pub use state::{is_transition_allowed, transition, RunState, RunTransition, StateMachineError};
pub use types::{
    AccumulatedChanges, ExistingTestFile, FileAnalysis, FileChange, FileDiff, GatingDecision,
    PrContext, PrContextWithTests, ReviewAnalysis, RunRecord, Step, TestProposal,
    TestProposalAction,
};
