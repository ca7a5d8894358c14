//! Analysis Configuration - extraction, plausibility bounds and report tuning
//!
//! Every tunable used by the pipeline is a field in this module. Each struct
//! implements `Default`, so an absent or empty config file reproduces the
//! built-in behaviour exactly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults::{CONFIG_ENV_VAR, LOCAL_CONFIG_FILE};
use crate::types::FieldKind;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an analysis deployment.
///
/// Load with `AnalysisConfig::load()` which searches:
/// 1. `$COMPLETION_ANALYZER_CONFIG` env var
/// 2. `./analysis_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Parameter extraction tuning
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Per-kind plausibility bounds (canonical units)
    #[serde(default)]
    pub bounds: BoundsConfig,

    /// Validation gate thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Report rendering
    #[serde(default)]
    pub report: ReportConfig,
}

impl AnalysisConfig {
    /// Load configuration using the standard search order:
    /// 1. `$COMPLETION_ANALYZER_CONFIG` environment variable
    /// 2. `./analysis_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded analysis config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded analysis config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Every bound must be finite with min < max
    /// - Window and tolerance must be positive
    /// - Confidence thresholds must lie in [0, 1]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        for (kind, bounds) in self.bounds.iter() {
            Self::check_bounds(bounds, kind.as_str(), &mut errors);
        }

        let x = &self.extraction;
        if x.label_window_chars == 0 {
            errors.push("extraction.label_window_chars must be > 0".to_string());
        }
        if !x.conflict_tolerance_percent.is_finite() || x.conflict_tolerance_percent <= 0.0 {
            errors.push(format!(
                "extraction.conflict_tolerance_percent ({}) must be a positive number",
                x.conflict_tolerance_percent
            ));
        }
        Self::check_unit_interval(
            x.min_document_confidence,
            "extraction.min_document_confidence",
            &mut errors,
        );

        let v = &self.validation;
        Self::check_unit_interval(v.min_confidence, "validation.min_confidence", &mut errors);
        if !v.max_velocity_m_s.is_finite() || v.max_velocity_m_s <= 0.0 {
            errors.push(format!(
                "validation.max_velocity_m_s ({}) must be a positive number",
                v.max_velocity_m_s
            ));
        }

        if self.report.decimals > 10 {
            errors.push(format!(
                "report.decimals ({}) must be <= 10",
                self.report.decimals
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_bounds(bounds: &Bounds, name: &str, errors: &mut Vec<String>) {
        // NaN/Inf comparisons silently pass, catch them explicitly
        if !bounds.min.is_finite() || !bounds.max.is_finite() {
            errors.push(format!(
                "bounds.{name}: values must be finite (got min={}, max={})",
                bounds.min, bounds.max
            ));
            return;
        }
        if bounds.min >= bounds.max {
            errors.push(format!(
                "bounds.{name}: min ({:.3}) must be < max ({:.3})",
                bounds.min, bounds.max
            ));
        }
    }

    fn check_unit_interval(value: f64, name: &str, errors: &mut Vec<String>) {
        if !(0.0..=1.0).contains(&value) {
            errors.push(format!("{name} ({value}) must be within [0, 1]"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Extraction
// ============================================================================

/// Parameter extraction tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Characters searched after a field label for its value
    #[serde(default = "default_label_window_chars")]
    pub label_window_chars: usize,

    /// Relative difference (%) under which two candidates agree
    #[serde(default = "default_conflict_tolerance_percent")]
    pub conflict_tolerance_percent: f64,

    /// OCR documents below this confidence mark extraction as partial
    #[serde(default = "default_min_document_confidence")]
    pub min_document_confidence: f64,
}

fn default_label_window_chars() -> usize {
    120
}
fn default_conflict_tolerance_percent() -> f64 {
    1.0
}
fn default_min_document_confidence() -> f64 {
    0.6
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            label_window_chars: default_label_window_chars(),
            conflict_tolerance_percent: default_conflict_tolerance_percent(),
            min_document_confidence: default_min_document_confidence(),
        }
    }
}

// ============================================================================
// Bounds
// ============================================================================

/// Inclusive plausibility range in the canonical unit of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Plausibility bounds per quantity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsConfig {
    /// m
    #[serde(default = "default_depth_bounds")]
    pub depth: Bounds,
    /// bar
    #[serde(default = "default_pressure_bounds")]
    pub pressure: Bounds,
    /// bar/m
    #[serde(default = "default_gradient_bounds")]
    pub pressure_gradient: Bounds,
    /// °C
    #[serde(default = "default_temperature_bounds")]
    pub temperature: Bounds,
    /// in
    #[serde(default = "default_diameter_bounds")]
    pub diameter: Bounds,
    /// kg/m³
    #[serde(default = "default_density_bounds")]
    pub density: Bounds,
    /// cP
    #[serde(default = "default_viscosity_bounds")]
    pub viscosity: Bounds,
    /// m³/h
    #[serde(default = "default_flow_rate_bounds")]
    pub flow_rate: Bounds,
}

fn default_depth_bounds() -> Bounds {
    Bounds::new(0.0, 10_000.0)
}
fn default_pressure_bounds() -> Bounds {
    Bounds::new(0.0, 1_000.0)
}
fn default_gradient_bounds() -> Bounds {
    Bounds::new(0.0, 0.5)
}
fn default_temperature_bounds() -> Bounds {
    Bounds::new(-20.0, 250.0)
}
fn default_diameter_bounds() -> Bounds {
    Bounds::new(0.5, 20.0)
}
fn default_density_bounds() -> Bounds {
    Bounds::new(500.0, 2_500.0)
}
fn default_viscosity_bounds() -> Bounds {
    Bounds::new(0.1, 10_000.0)
}
fn default_flow_rate_bounds() -> Bounds {
    Bounds::new(0.0, 2_000.0)
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            depth: default_depth_bounds(),
            pressure: default_pressure_bounds(),
            pressure_gradient: default_gradient_bounds(),
            temperature: default_temperature_bounds(),
            diameter: default_diameter_bounds(),
            density: default_density_bounds(),
            viscosity: default_viscosity_bounds(),
            flow_rate: default_flow_rate_bounds(),
        }
    }
}

impl BoundsConfig {
    /// Bounds for a quantity kind; `None` for dates, flags and text.
    pub fn for_kind(&self, kind: FieldKind) -> Option<Bounds> {
        match kind {
            FieldKind::Depth => Some(self.depth),
            FieldKind::Pressure => Some(self.pressure),
            FieldKind::PressureGradient => Some(self.pressure_gradient),
            FieldKind::Temperature => Some(self.temperature),
            FieldKind::Diameter => Some(self.diameter),
            FieldKind::Density => Some(self.density),
            FieldKind::Viscosity => Some(self.viscosity),
            FieldKind::FlowRate => Some(self.flow_rate),
            FieldKind::Date | FieldKind::Boolean | FieldKind::FreeText => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKind, &Bounds)> {
        [
            (FieldKind::Depth, &self.depth),
            (FieldKind::Pressure, &self.pressure),
            (FieldKind::PressureGradient, &self.pressure_gradient),
            (FieldKind::Temperature, &self.temperature),
            (FieldKind::Diameter, &self.diameter),
            (FieldKind::Density, &self.density),
            (FieldKind::Viscosity, &self.viscosity),
            (FieldKind::FlowRate, &self.flow_rate),
        ]
        .into_iter()
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Validation gate thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Fields extracted below this confidence are flagged LOW_CONFIDENCE
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Tubing velocity above this is flagged as implausible (m/s)
    #[serde(default = "default_max_velocity_m_s")]
    pub max_velocity_m_s: f64,
}

fn default_min_confidence() -> f64 {
    0.5
}
fn default_max_velocity_m_s() -> f64 {
    30.0
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_velocity_m_s: default_max_velocity_m_s(),
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Report rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Emit follow-up questions for missing nodal inputs
    #[serde(default = "default_include_questions")]
    pub include_questions: bool,

    /// Decimal places in the Markdown skeleton
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

fn default_include_questions() -> bool {
    true
}
fn default_decimals() -> usize {
    2
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_questions: default_include_questions(),
            decimals: default_decimals(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
