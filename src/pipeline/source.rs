//! Document and override sources.
//!
//! Provides a trait for turning a file into a `RawTextDocument`, so the
//! analysis core never sees PDF/OCR concerns. An external text extractor writes
//! plain text plus an optional `<file>.meta.json` sidecar:
//!
//! ```json
//! { "used_ocr": true, "confidence": 0.72 }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::defaults::OCR_SIDECAR_SUFFIX;
use crate::types::{NodalInputs, RawTextDocument};

/// Errors reading documents or override files.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid sidecar metadata {0}: {1}")]
    Sidecar(PathBuf, #[source] serde_json::Error),

    #[error("invalid nodal inputs {0}: {1}")]
    Overrides(PathBuf, #[source] serde_json::Error),

    #[error("nodal inputs {0} must be a JSON object")]
    NotAnObject(PathBuf),
}

/// Trait abstracting where report text comes from.
///
/// Implementations own format handling (plain text, OCR output, ...). The
/// orchestrator only consumes the resulting document.
pub trait TextSource: Send + Sync {
    fn extract(&self, path: &Path) -> Result<RawTextDocument, SourceError>;

    /// Human-readable name for logging.
    fn source_name(&self) -> &str;
}

// ============================================================================
// Plain text (with optional OCR sidecar)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SidecarMeta {
    #[serde(default)]
    used_ocr: bool,
    #[serde(default = "full_confidence")]
    confidence: f64,
}

fn full_confidence() -> f64 {
    1.0
}

/// Reads UTF-8 text files. Invalid byte sequences are replaced, not rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextSource;

impl PlainTextSource {
    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(OCR_SIDECAR_SUFFIX);
        PathBuf::from(name)
    }
}

impl TextSource for PlainTextSource {
    fn extract(&self, path: &Path) -> Result<RawTextDocument, SourceError> {
        let bytes = std::fs::read(path).map_err(|e| SourceError::Io(path.to_path_buf(), e))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let sidecar = Self::sidecar_path(path);
        let document = if sidecar.exists() {
            let raw = std::fs::read_to_string(&sidecar)
                .map_err(|e| SourceError::Io(sidecar.clone(), e))?;
            let meta: SidecarMeta =
                serde_json::from_str(&raw).map_err(|e| SourceError::Sidecar(sidecar.clone(), e))?;
            debug!(path = %sidecar.display(), used_ocr = meta.used_ocr, confidence = meta.confidence, "Loaded text sidecar");
            if meta.used_ocr {
                RawTextDocument::from_ocr(text, meta.confidence)
            } else {
                RawTextDocument::new(text)
            }
        } else {
            RawTextDocument::new(text)
        };

        Ok(document.with_source(path.display().to_string()))
    }

    fn source_name(&self) -> &str {
        "plain-text"
    }
}

// ============================================================================
// Nodal input overrides
// ============================================================================

const OVERRIDE_KEYS: [&str; 11] = [
    "wellhead_pressure_bar",
    "flow_rate_m3_h",
    "tubing_inner_diameter_in",
    "tubing_diameter_in",
    "fluid_density_kg_m3",
    "fluid_viscosity_cp",
    "fluid_viscosity_cP",
    "reservoir_temperature_c",
    "depth_m",
    "reservoir_pressure_bar",
    "pressure_gradient_bar_m",
];

/// Parse a nodal inputs JSON document. Null or absent keys are left unset;
/// unknown keys are ignored with a warning.
pub fn parse_overrides(contents: &str, origin: &Path) -> Result<NodalInputs, SourceError> {
    let value: serde_json::Value = serde_json::from_str(contents)
        .map_err(|e| SourceError::Overrides(origin.to_path_buf(), e))?;
    let Some(object) = value.as_object() else {
        return Err(SourceError::NotAnObject(origin.to_path_buf()));
    };

    let known: HashSet<&str> = OVERRIDE_KEYS.into_iter().collect();
    for key in object.keys().filter(|k| !known.contains(k.as_str())) {
        warn!(key = %key, path = %origin.display(), "Ignoring unknown nodal input key");
    }

    serde_json::from_value(value).map_err(|e| SourceError::Overrides(origin.to_path_buf(), e))
}

/// Read a nodal inputs JSON file.
pub fn load_overrides(path: &Path) -> Result<NodalInputs, SourceError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| SourceError::Io(path.to_path_buf(), e))?;
    let inputs = parse_overrides(&contents, path)?;
    debug!(path = %path.display(), fields = ?inputs.populated(), "Loaded nodal inputs");
    Ok(inputs)
}
