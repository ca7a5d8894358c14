//! Validation Module
//!
//! - `ValidationGate::validate()` - bounds, conflicts, confidence, overrides,
//!   readiness of the nodal input set
//! - `ValidationGate::validate_result()` - sanity checks on a computed result

mod gate;
pub mod readiness;

pub use gate::ValidationGate;
pub use readiness::{assess, nodal_inputs};
