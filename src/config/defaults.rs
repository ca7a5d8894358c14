//! System-wide default constants.
//!
//! Physical constants and fixed thresholds that are not operator-tunable.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Configuration Loading
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "COMPLETION_ANALYZER_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "analysis_config.toml";

// ============================================================================
// Physics
// ============================================================================

/// Standard gravity (m/s²).
pub const GRAVITY_M_S2: f64 = 9.806_65;

/// Upper Reynolds number of the laminar regime (exclusive).
pub const RE_LAMINAR_MAX: f64 = 2_300.0;

/// Lower Reynolds number of the turbulent regime (inclusive).
pub const RE_TURBULENT_MIN: f64 = 4_000.0;

/// Blasius correlation coefficient: f = 0.316 · Re^-0.25.
pub const BLASIUS_COEFFICIENT: f64 = 0.316;

// ============================================================================
// Extraction
// ============================================================================

/// Base confidence of a value found after its label.
pub const LABELLED_CONFIDENCE: f64 = 0.9;

/// Base confidence of a keyword presence match (ESP, GRE, MTI).
pub const KEYWORD_CONFIDENCE: f64 = 0.7;

/// Sidecar suffix carrying OCR metadata next to a text file.
pub const OCR_SIDECAR_SUFFIX: &str = ".meta.json";
