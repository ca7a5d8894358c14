//! Analysis Pipeline Module
//!
//! ## Stage Architecture
//!
//! ```text
//! Init ─► Extraction ─► Validation ─► Calculation ─► Reporting ─► Reported
//!   └──► Failed (no usable text; every stage Skipped)
//! ```
//!
//! The only shared object is the immutable [`AnalysisContext`]: configuration
//! plus the compiled pattern registry, built once and handed to every run.

mod coordinator;
pub mod source;
mod state;

use std::sync::Arc;

pub use coordinator::Orchestrator;
pub use source::{load_overrides, parse_overrides, PlainTextSource, SourceError, TextSource};
pub use state::{PipelineError, RunTracker};

use crate::config::AnalysisConfig;
use crate::extraction::{PatternRegistry, RegistryError};
use crate::types::{AnalysisResult, NodalInputs, RawTextDocument};

/// Configuration and compiled patterns shared by every run.
#[derive(Debug)]
pub struct AnalysisContext {
    pub config: AnalysisConfig,
    pub registry: PatternRegistry,
}

impl AnalysisContext {
    /// Compile the pattern registry for `config`.
    pub fn new(config: AnalysisConfig) -> Result<Self, RegistryError> {
        Ok(Self {
            config,
            registry: PatternRegistry::new()?,
        })
    }
}

/// Analyse a plain digital text in one call.
pub fn run_analysis(
    context: &Arc<AnalysisContext>,
    text: &str,
    overrides: Option<&NodalInputs>,
) -> AnalysisResult {
    Orchestrator::new(Arc::clone(context)).run_analysis(RawTextDocument::new(text), overrides)
}
