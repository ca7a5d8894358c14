//! Shared data structures for completion report analysis
//!
//! This module defines the types that flow through the analysis pipeline:
//! - Input: RawTextDocument (report text + OCR metadata)
//! - Extraction: ExtractedField, Extraction (typed candidates with provenance)
//! - Validation: ParameterSet, ValidationReport, Readiness
//! - Calculation: NodalInputs, NodalResult
//! - Output: AnalysisResult (stage outcomes + audit trail)

mod audit;
mod document;
mod field;
mod nodal;
mod parameters;
mod report;
mod state;

pub use audit::*;
pub use document::*;
pub use field::*;
pub use nodal::*;
pub use parameters::*;
pub use report::*;
pub use state::*;
