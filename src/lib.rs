//! completion-analyzer: Completion Report Intelligence
//!
//! Turns noisy completion/workover report text into a validated parameter set
//! and, when the inputs allow it, a single-point nodal analysis.
//!
//! ## Architecture
//!
//! - **Extraction**: registry-driven label and keyword search with unit normalization
//! - **Validation**: plausibility bounds, conflict flags, caller overrides, readiness
//! - **Physics Engine**: wellbore hydraulics (Reynolds, Darcy-Weisbach) and linear IPR
//! - **Pipeline**: staged orchestration with per-stage outcomes and an audit trail
//! - **Report**: one canonical `AnalysisResult` with JSON and Markdown renderings

pub mod config;
pub mod extraction;
pub mod physics_engine;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod units;
pub mod validation;

// Re-export configuration
pub use config::{AnalysisConfig, ConfigError};

// Re-export commonly used types
pub use types::{
    AnalysisResult, AuditEntry, Extraction, FieldName, FieldValue, IssueCode, NodalInputs,
    NodalResult, ParameterSet, PipelineState, RawTextDocument, Severity, Stage, StageError,
    StageStatus, ValidationReport,
};

// Re-export components
pub use extraction::{ParameterExtractor, PatternRegistry};
pub use physics_engine::NodalError;
pub use pipeline::{run_analysis, AnalysisContext, Orchestrator, PipelineError};
pub use report::ReportAssembler;
pub use units::Unit;
pub use validation::ValidationGate;
