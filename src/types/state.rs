//! Pipeline state machine states

use serde::{Deserialize, Serialize};

/// Analysis pipeline state.
///
/// ```text
/// Init ──► Extracted ──► Validated ──► Calculated ──► Reported
///   │          │              │                          ▲
///   │          └──────────────┴──────────────────────────┘  (stage failed / cancelled)
///   └──► Failed  (empty or unreadable document)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Extracted,
    Validated,
    Calculated,
    Reported,
    Failed,
}

impl PipelineState {
    /// Whether `self → next` is an allowed edge.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Init, Extracted)
                | (Init, Failed)
                | (Extracted, Validated)
                | (Extracted, Reported)
                | (Validated, Calculated)
                | (Validated, Reported)
                | (Calculated, Reported)
        )
    }

    /// No further transitions possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Reported | PipelineState::Failed)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Init => write!(f, "Init"),
            PipelineState::Extracted => write!(f, "Extracted"),
            PipelineState::Validated => write!(f, "Validated"),
            PipelineState::Calculated => write!(f, "Calculated"),
            PipelineState::Reported => write!(f, "Reported"),
            PipelineState::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_edges() {
        assert!(PipelineState::Init.can_transition_to(PipelineState::Extracted));
        assert!(PipelineState::Extracted.can_transition_to(PipelineState::Validated));
        assert!(PipelineState::Validated.can_transition_to(PipelineState::Calculated));
        assert!(PipelineState::Calculated.can_transition_to(PipelineState::Reported));
    }

    #[test]
    fn test_rejected_edges() {
        assert!(!PipelineState::Init.can_transition_to(PipelineState::Calculated));
        assert!(!PipelineState::Reported.can_transition_to(PipelineState::Init));
        assert!(!PipelineState::Failed.can_transition_to(PipelineState::Reported));
        assert!(!PipelineState::Calculated.can_transition_to(PipelineState::Validated));
    }

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::Reported.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Validated.is_terminal());
    }
}
