//! Pattern registry: compiled once, shared read-only across runs
//!
//! Two tables drive extraction:
//! - per `FieldKind`, the ordered value rules (one per unit variant for
//!   quantities, canonical unit first)
//! - per `FieldName`, how to locate the field: a label whose trailing window
//!   is searched with the kind's rules, or standalone anywhere-rules

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use regex::Regex;

use crate::config::defaults::{KEYWORD_CONFIDENCE, LABELLED_CONFIDENCE};
use crate::types::{FieldKind, FieldName};
use crate::units::Unit;

/// Numeric token: digits with separators, optionally a trailing fraction ("9 5/8").
const NUMBER: &str = r"[-+]?\d[\d.,/]*(?:[ \t]+\d+/\d+)?";

/// Dates as they are written in daily reports.
const DATE: &str = r"(?i)\b(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[./-]\d{1,2}[./-]\d{2,4}|\d{1,2}(?:st|nd|rd|th)?\s+[a-z]{3,9}\.?,?\s+\d{4}|[a-z]{3,9}\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4})\b";

/// Rest of the window, trimmed later.
const TEXT: &str = r"(?P<text>[^\n]+)";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid pattern for {subject}: {source}")]
    Pattern {
        subject: String,
        #[source]
        source: regex::Error,
    },
}

fn compile(subject: impl std::fmt::Display, pattern: &str) -> Result<Regex, RegistryError> {
    Regex::new(pattern).map_err(|source| RegistryError::Pattern {
        subject: subject.to_string(),
        source,
    })
}

// ============================================================================
// Rules
// ============================================================================

/// How a rule's match becomes a `FieldValue`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalizer {
    /// `num` capture in the given unit, converted to canonical
    Quantity(Unit),
    /// Whole match parsed as a calendar date
    Date,
    /// Presence of the match means this value
    Flag(bool),
    /// `text` capture, cleaned
    Text,
}

/// One ordered pattern with its normalizer and base confidence.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub pattern: Regex,
    pub normalizer: Normalizer,
    pub confidence: f64,
}

/// Where to look for a field.
#[derive(Debug, Clone)]
pub enum Locator {
    /// Search the window after each label match with the kind's rules
    Label(Regex),
    /// Field-specific rules run over the whole document; first match per rule
    Anywhere(Vec<PatternRule>),
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub field: FieldName,
    pub locator: Locator,
}

/// Unit spellings accepted after a number. Longer spellings come first
/// because regex alternation is leftmost-first.
fn unit_pattern(unit: Unit) -> &'static str {
    match unit {
        Unit::Metre => r"(?i:metres?|meters?|m(?:MD|TVD|AHGL|AHBGL|RKB)?)",
        Unit::Foot => r"(?i:feet|foot|ft)|'",
        Unit::Bar => r"(?i:bar[ag]?)",
        Unit::Psi => r"(?i:psi[ag]?)",
        Unit::KiloPascal => r"(?i:kpa)",
        // Case-sensitive so "mPa·s" is never read as megapascal
        Unit::MegaPascal => r"MPa",
        Unit::BarPerMetre => r"(?i:bar\s*/\s*m)",
        Unit::PsiPerFoot => r"(?i:psi\s*/\s*ft)",
        Unit::Celsius => r"(?:°|º|(?i:deg\.?)\s*)\s*C|(?i:celsius)|C",
        Unit::Fahrenheit => r"(?:°|º|(?i:deg\.?)\s*)\s*F|(?i:fahrenheit)|F",
        Unit::Inch => r#"(?i:inches|inch|in)|"|”|''"#,
        Unit::Millimetre => r"(?i:mm)",
        Unit::KgPerCubicMetre => r"(?i:kg\s*/\s*m(?:3|³))",
        Unit::GramPerCubicCentimetre => r"(?i:g\s*/\s*cm(?:3|³)|g/cc|sg|s\.g\.)",
        Unit::PoundPerGallon => r"(?i:ppg|lb\s*/\s*gal)",
        Unit::Centipoise => r"(?i:centipoise|cp)|mPa\s*[·.*]?\s*s",
        Unit::PascalSecond => r"Pa\s*[·.*]?\s*s",
        Unit::CubicMetrePerHour => r"(?i:m(?:3|³)\s*/\s*h(?:our|r)?)",
        Unit::CubicMetrePerDay => r"(?i:m(?:3|³)\s*/\s*d(?:ay)?)",
        Unit::BarrelPerDay => r"(?i:bbls?\s*/\s*d(?:ay)?|stb\s*/\s*d|bpd|b/d)",
        Unit::LitrePerMinute => r"(?i:l\s*/\s*min|lpm)",
    }
}

fn quantity_rule(unit: Unit) -> Result<PatternRule, RegistryError> {
    let pattern = format!(r"(?P<num>{NUMBER})\s*(?P<unit>{})", unit_pattern(unit));
    let confidence = if unit.is_canonical() {
        LABELLED_CONFIDENCE
    } else {
        LABELLED_CONFIDENCE - 0.05
    };
    Ok(PatternRule {
        pattern: compile(unit, &pattern)?,
        normalizer: Normalizer::Quantity(unit),
        confidence,
    })
}

fn kind_rules(kind: FieldKind) -> Result<Vec<PatternRule>, RegistryError> {
    match kind {
        FieldKind::Date => Ok(vec![PatternRule {
            pattern: compile(kind, DATE)?,
            normalizer: Normalizer::Date,
            confidence: LABELLED_CONFIDENCE - 0.05,
        }]),
        FieldKind::FreeText => Ok(vec![PatternRule {
            pattern: compile(kind, TEXT)?,
            normalizer: Normalizer::Text,
            confidence: LABELLED_CONFIDENCE - 0.1,
        }]),
        // Booleans are always located by anywhere-rules
        FieldKind::Boolean => Ok(Vec::new()),
        _ => Unit::variants_of(kind).iter().map(|u| quantity_rule(*u)).collect(),
    }
}

// ============================================================================
// Field Locators
// ============================================================================

fn label_pattern(field: FieldName) -> Option<&'static str> {
    let pattern = match field {
        FieldName::WellName => r"(?im)^\s*well\s*name\b|^\s*well\s*:",
        FieldName::Operation => r"(?im)^\s*operation\b",
        FieldName::StartOfOperation => r"(?i)\bstart\s+of\s+operations?\b|\bspud\s+date\b",
        FieldName::Duration => r"(?im)^\s*duration\b",
        FieldName::HandOverDate => r"(?i)\bhanded\b[^\n]{0,60}?\bto\s+operations\s+on\b",
        FieldName::TotalDepth => r"(?i)\b(?:well\s+)?total\s+depth\b|\b(?-i:TD)\b",
        FieldName::PackerSetDepth => {
            r"(?i)\b(?:packer|liner\s+hanger)\b[^\n]{0,60}?\bset\b|\bset\b[^\n]{0,60}?\b(?:packer|liner\s+hanger)\b"
        }
        FieldName::PbrBottomDepth => r"(?i)\bmule\s+shoe\b|\bbottom\s+of\s+(?:the\s+)?PBR\b",
        FieldName::WellheadPressure => {
            r"(?i)\b(?:well\s*head|tubing\s+head)\s+pressure\b|\b(?-i:F?THP|WHP)\b"
        }
        FieldName::AnnulusTestPressure => {
            r"(?i)\bpressure\s+tested\s+(?:the\s+)?annulus\b|\bannulus\s+test\s+pressure\b"
        }
        FieldName::ReservoirPressure => r"(?i)\b(?:static\s+)?reservoir\s+pressure\b",
        FieldName::PressureGradient => r"(?i)\b(?:pore\s+|reservoir\s+)?pressure\s+gradient\b",
        FieldName::ReservoirTemperature => {
            r"(?i)\bbottom\s*hole\s+temperature\b|\b(?-i:BHT)\b|\b(?:reservoir|formation)\s+temperature\b"
        }
        FieldName::TubingDiameter => {
            r"(?i)\btubing\s+(?:inner\s+diameter|internal\s+diameter|I\.?D\b)"
        }
        FieldName::FluidDensity => r"(?i)\b(?:(?:fluid|brine|mud)\s+)?density\b",
        FieldName::FluidViscosity => r"(?i)\b(?:fluid\s+|dynamic\s+)?viscosity\b",
        FieldName::FlowRate => r"(?im)\b(?:flow|production|injection)\s+rate\b|^\s*rate\b",
        FieldName::ReservoirFluid => r"(?i)\bwell\s*bore\s+fluids?\b|\breservoir\s+fluid\b",
        FieldName::HseIncidentFree
        | FieldName::EspInstalled
        | FieldName::GreString
        | FieldName::MtiLogged => return None,
    };
    Some(pattern)
}

fn keyword_rules(field: FieldName) -> Vec<(&'static str, bool, f64)> {
    match field {
        FieldName::HseIncidentFree => vec![
            (r"(?i)\b(?:no|zero|0)\s+(?:hse\s+|lost[\s-]+time\s+)?incidents?\b", true, 0.8),
            (r"(?i)\b[1-9]\d*\s+(?:hse\s+)?incidents?\s+(?:were\s+|was\s+)?reported\b", false, 0.8),
        ],
        FieldName::EspInstalled => vec![(r"\bESP\b", true, KEYWORD_CONFIDENCE)],
        FieldName::GreString => vec![(r"\bGRE\b", true, KEYWORD_CONFIDENCE)],
        FieldName::MtiLogged => vec![(r"\bMTI\b", true, KEYWORD_CONFIDENCE)],
        _ => Vec::new(),
    }
}

fn field_spec(field: FieldName) -> Result<FieldSpec, RegistryError> {
    let locator = match label_pattern(field) {
        Some(pattern) => Locator::Label(compile(field, pattern)?),
        None => Locator::Anywhere(
            keyword_rules(field)
                .into_iter()
                .map(|(pattern, flag, confidence)| {
                    Ok(PatternRule {
                        pattern: compile(field, pattern)?,
                        normalizer: Normalizer::Flag(flag),
                        confidence,
                    })
                })
                .collect::<Result<Vec<_>, RegistryError>>()?,
        ),
    };
    Ok(FieldSpec { field, locator })
}

// ============================================================================
// Registry
// ============================================================================

/// Compiled extraction tables.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    kinds: HashMap<FieldKind, Vec<PatternRule>>,
    fields: Vec<FieldSpec>,
}

impl PatternRegistry {
    /// Compile every rule and locator.
    pub fn new() -> Result<Self, RegistryError> {
        let mut kinds = HashMap::new();
        for field in FieldName::ALL {
            if let Entry::Vacant(slot) = kinds.entry(field.kind()) {
                slot.insert(kind_rules(field.kind())?);
            }
        }
        let fields = FieldName::ALL
            .iter()
            .map(|f| field_spec(*f))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { kinds, fields })
    }

    /// Ordered value rules for a kind.
    pub fn rules(&self, kind: FieldKind) -> &[PatternRule] {
        self.kinds.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Field locators in report order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}
