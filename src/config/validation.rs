//! Config validation: unknown-key detection with Levenshtein suggestions
//! and typical-range checks on the bounds.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::AnalysisConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

const BOUND_SECTIONS: [&str; 8] = [
    "depth",
    "pressure",
    "pressure_gradient",
    "temperature",
    "diameter",
    "density",
    "viscosity",
    "flow_rate",
];

/// Returns the complete set of valid dotted key paths for AnalysisConfig.
///
/// Maintained manually to match the struct hierarchy in analysis_config.rs.
pub fn known_config_keys() -> HashSet<String> {
    let mut keys: HashSet<String> = [
        "extraction",
        "extraction.label_window_chars",
        "extraction.conflict_tolerance_percent",
        "extraction.min_document_confidence",
        "bounds",
        "validation",
        "validation.min_confidence",
        "validation.max_velocity_m_s",
        "report",
        "report.include_questions",
        "report.decimals",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect();

    for section in BOUND_SECTIONS {
        keys.insert(format!("bounds.{section}"));
        keys.insert(format!("bounds.{section}.min"));
        keys.insert(format!("bounds.{section}.max"));
    }
    keys
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<String>) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.clone())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Typical Range Checks
// ============================================================================

/// Flag bounds that are valid but unusual for completion work.
///
/// These never fail loading; the CLI logs them at startup.
pub fn validate_typical_ranges(config: &AnalysisConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let b = &config.bounds;

    // Negative depth or pressure lower bounds admit physically meaningless values
    for (name, bounds) in [("depth", &b.depth), ("pressure", &b.pressure), ("flow_rate", &b.flow_rate)] {
        if bounds.min < 0.0 {
            warnings.push(ValidationWarning {
                field: format!("bounds.{name}.min"),
                message: format!("bounds.{name}.min = {} admits negative values", bounds.min),
                suggestion: None,
            });
        }
    }

    // Deepest wells on record are ~12 km
    if b.depth.max > 15_000.0 {
        warnings.push(ValidationWarning {
            field: "bounds.depth.max".to_string(),
            message: format!("bounds.depth.max = {} m exceeds any drilled well", b.depth.max),
            suggestion: None,
        });
    }

    // Water is 1000 kg/m³; heavy brines top out near 2300
    if b.density.min < 100.0 {
        warnings.push(ValidationWarning {
            field: "bounds.density.min".to_string(),
            message: format!(
                "bounds.density.min = {} kg/m³ is below any completion fluid",
                b.density.min
            ),
            suggestion: None,
        });
    }

    if config.validation.min_confidence > 0.95 {
        warnings.push(ValidationWarning {
            field: "validation.min_confidence".to_string(),
            message: format!(
                "validation.min_confidence = {} flags nearly every extracted value",
                config.validation.min_confidence
            ),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================
