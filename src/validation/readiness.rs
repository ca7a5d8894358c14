//! Nodal input readiness

use crate::types::{NodalInputs, ParameterSet, Readiness, ValueSource, REQUIRED_NODAL_FIELDS};

/// Nodal inputs read from a parameter set (canonical units match the engine's).
pub fn nodal_inputs(params: &ParameterSet) -> NodalInputs {
    NodalInputs::FIELDS
        .iter()
        .fold(NodalInputs::default(), |inputs, field| match params.quantity(*field) {
            Some(value) => inputs.with(*field, value),
            None => inputs,
        })
}

/// Which required nodal inputs are present, absent or conflicting.
///
/// Conflicts never block readiness; a caller override resolves a conflict.
pub fn assess(params: &ParameterSet) -> Readiness {
    let inputs = nodal_inputs(params);
    let (present, absent): (Vec<_>, Vec<_>) = REQUIRED_NODAL_FIELDS
        .iter()
        .copied()
        .partition(|f| inputs.get(*f).is_some());

    let conflicting = present
        .iter()
        .copied()
        .filter(|f| {
            params.get(*f).is_some_and(|e| {
                e.provenance.source == ValueSource::Extracted && e.provenance.is_conflicting()
            })
        })
        .collect();

    Readiness {
        ready: absent.is_empty(),
        present,
        absent,
        conflicting,
    }
}
