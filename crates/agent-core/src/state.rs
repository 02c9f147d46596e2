//! Orchestrator state machine (C15).
//!
//! ```text
//! INIT → PLANNING → STEP(i) ─success→ STEP(i+1) → … → FINAL_REVIEW
//!                      └failure→ _ABORTED_
//! FINAL_REVIEW ─tests-pass→ _READY_FOR_REVIEW_
//!              └tests-fail(k)→ _TEST_BUDGET_EXHAUSTED_
//! PLANNING ─PlanError→ _NO_PLAN_
//! ```
//!
//! Transitions are strictly forward; no step is retried. The bounded
//! test-repair loop inside a step is an internal loop, not a state
//! transition, and is not represented here.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Init,
    Planning,
    /// 1-indexed step number currently executing.
    Step(u32),
    FinalReview,
    Aborted,
    ReadyForReview,
    TestBudgetExhausted,
    NoPlan,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Init => write!(f, "INIT"),
            RunState::Planning => write!(f, "PLANNING"),
            RunState::Step(i) => write!(f, "STEP({i})"),
            RunState::FinalReview => write!(f, "FINAL_REVIEW"),
            RunState::Aborted => write!(f, "ABORTED"),
            RunState::ReadyForReview => write!(f, "READY_FOR_REVIEW"),
            RunState::TestBudgetExhausted => write!(f, "TEST_BUDGET_EXHAUSTED"),
            RunState::NoPlan => write!(f, "NO_PLAN"),
        }
    }
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Aborted
                | RunState::ReadyForReview
                | RunState::TestBudgetExhausted
                | RunState::NoPlan
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateMachineError {
    #[error("invalid orchestrator state transition: {from} -> {to}")]
    InvalidTransition { from: RunState, to: RunState },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTransition {
    pub from: RunState,
    pub to: RunState,
    pub at: DateTime<Utc>,
}

/// Check if a state transition is valid. Pure; does not mutate anything.
pub fn is_transition_allowed(from: RunState, to: RunState) -> bool {
    use RunState::*;

    if from == to {
        return true;
    }

    match (from, to) {
        (Init, Planning) => true,
        (Planning, Step(1)) => true,
        (Planning, NoPlan) => true,
        (Step(i), Step(j)) => j == i + 1,
        (Step(_), FinalReview) => true,
        (Step(_), Aborted) => true,
        (FinalReview, ReadyForReview) => true,
        (FinalReview, TestBudgetExhausted) => true,
        _ => false,
    }
}

/// Attempt a transition, returning a record of it on success.
pub fn transition(
    current: &mut RunState,
    to: RunState,
    at: DateTime<Utc>,
) -> Result<RunTransition, StateMachineError> {
    let from = *current;
    if !is_transition_allowed(from, to) {
        return Err(StateMachineError::InvalidTransition { from, to });
    }
    *current = to;
    Ok(RunTransition { from, to, at })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_flow_is_allowed() {
        assert!(is_transition_allowed(RunState::Init, RunState::Planning));
        assert!(is_transition_allowed(RunState::Planning, RunState::Step(1)));
        assert!(is_transition_allowed(RunState::Step(1), RunState::Step(2)));
        assert!(is_transition_allowed(RunState::Step(2), RunState::FinalReview));
        assert!(is_transition_allowed(RunState::FinalReview, RunState::ReadyForReview));
    }

    #[test]
    fn steps_cannot_be_skipped_or_retried_backwards() {
        assert!(!is_transition_allowed(RunState::Step(1), RunState::Step(3)));
        assert!(!is_transition_allowed(RunState::Step(2), RunState::Step(1)));
    }

    #[test]
    fn plan_error_and_test_budget_exhaustion_are_reachable() {
        assert!(is_transition_allowed(RunState::Planning, RunState::NoPlan));
        assert!(is_transition_allowed(
            RunState::FinalReview,
            RunState::TestBudgetExhausted
        ));
    }

    #[test]
    fn terminal_states_are_flagged() {
        assert!(RunState::Aborted.is_terminal());
        assert!(RunState::ReadyForReview.is_terminal());
        assert!(RunState::TestBudgetExhausted.is_terminal());
        assert!(RunState::NoPlan.is_terminal());
        assert!(!RunState::Step(1).is_terminal());
    }

    #[test]
    fn transition_rejects_invalid_jump() {
        let mut state = RunState::Init;
        let err = transition(&mut state, RunState::FinalReview, Utc::now()).unwrap_err();
        assert!(matches!(err, StateMachineError::InvalidTransition { .. }));
        assert_eq!(state, RunState::Init);
    }

    #[test]
    fn transition_mutates_on_success() {
        let mut state = RunState::Init;
        let at = Utc::now();
        let result = transition(&mut state, RunState::Planning, at).unwrap();
        assert_eq!(result.from, RunState::Init);
        assert_eq!(result.to, RunState::Planning);
        assert_eq!(state, RunState::Planning);
    }

    #[test]
    fn self_transition_is_idempotent() {
        assert!(is_transition_allowed(RunState::Step(2), RunState::Step(2)));
    }
}
