//! Analysis Configuration Module
//!
//! Provides analysis tuning loaded from TOML files: extraction windows,
//! per-kind plausibility bounds, validation thresholds and report options.
//!
//! ## Loading Order
//!
//! 1. `COMPLETION_ANALYZER_CONFIG` environment variable (path to TOML file)
//! 2. `analysis_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! The config is not global. Load it once and hand it to the pipeline inside
//! an `AnalysisContext`:
//!
//! ```ignore
//! let ctx = AnalysisContext::new(AnalysisConfig::load())?;
//! let orchestrator = Orchestrator::new(Arc::new(ctx));
//! ```

mod analysis_config;
pub mod defaults;
pub mod validation;

pub use analysis_config::*;
