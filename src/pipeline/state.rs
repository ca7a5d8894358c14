//! Run state tracking
//!
//! Every state change goes through `RunTracker::advance`, which rejects edges
//! the state machine does not allow and records the ones it does.

use thiserror::Error;

use crate::types::PipelineState;

/// Orchestration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("invalid pipeline transition {from} -> {to}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

/// Current state plus the ordered trail of every state visited.
#[derive(Debug, Clone)]
pub struct RunTracker {
    current: PipelineState,
    trail: Vec<PipelineState>,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            current: PipelineState::Init,
            trail: vec![PipelineState::Init],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.current
    }

    /// Move to `next` if the edge is allowed.
    pub fn advance(&mut self, next: PipelineState) -> Result<(), PipelineError> {
        if !self.current.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        self.current = next;
        self.trail.push(next);
        Ok(())
    }

    pub fn trail(&self) -> &[PipelineState] {
        &self.trail
    }

    pub fn into_trail(self) -> Vec<PipelineState> {
        self.trail
    }
}
