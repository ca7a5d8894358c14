//! Field identities, kinds, values and extraction provenance

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::IssueCode;
use crate::units::Unit;

// ============================================================================
// Field Kind
// ============================================================================

/// Physical or semantic kind of a report field.
///
/// The kind selects the ordered pattern/normalizer rules the extractor runs
/// and the plausibility bounds the validation gate applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Depth,
    Pressure,
    PressureGradient,
    Temperature,
    Diameter,
    Density,
    Viscosity,
    FlowRate,
    Date,
    Boolean,
    FreeText,
}

impl FieldKind {
    /// Whether values of this kind are numeric quantities with units.
    pub fn is_quantity(self) -> bool {
        !matches!(self, FieldKind::Date | FieldKind::Boolean | FieldKind::FreeText)
    }

    /// Coarse physical range (canonical units) used by the extractor to pick
    /// the primary candidate. Much wider than the configured validation bounds.
    pub fn coarse_range(self) -> Option<(f64, f64)> {
        match self {
            FieldKind::Depth => Some((0.0, 15_000.0)),
            FieldKind::Pressure => Some((0.0, 2_000.0)),
            FieldKind::PressureGradient => Some((0.0, 1.0)),
            FieldKind::Temperature => Some((-50.0, 400.0)),
            FieldKind::Diameter => Some((0.0, 48.0)),
            FieldKind::Density => Some((100.0, 3_000.0)),
            FieldKind::Viscosity => Some((0.0, 1_000_000.0)),
            FieldKind::FlowRate => Some((0.0, 10_000.0)),
            FieldKind::Date | FieldKind::Boolean | FieldKind::FreeText => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Depth => "depth",
            FieldKind::Pressure => "pressure",
            FieldKind::PressureGradient => "pressure_gradient",
            FieldKind::Temperature => "temperature",
            FieldKind::Diameter => "diameter",
            FieldKind::Density => "density",
            FieldKind::Viscosity => "viscosity",
            FieldKind::FlowRate => "flow_rate",
            FieldKind::Date => "date",
            FieldKind::Boolean => "boolean",
            FieldKind::FreeText => "free_text",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Field Name
// ============================================================================

/// Every field the extractor knows how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    WellName,
    Operation,
    StartOfOperation,
    Duration,
    HandOverDate,
    TotalDepth,
    PackerSetDepth,
    PbrBottomDepth,
    WellheadPressure,
    AnnulusTestPressure,
    ReservoirPressure,
    PressureGradient,
    ReservoirTemperature,
    TubingDiameter,
    FluidDensity,
    FluidViscosity,
    FlowRate,
    ReservoirFluid,
    HseIncidentFree,
    EspInstalled,
    GreString,
    MtiLogged,
}

/// Fields the nodal engine cannot run without, in the order they are reported.
pub const REQUIRED_NODAL_FIELDS: [FieldName; 7] = [
    FieldName::WellheadPressure,
    FieldName::FlowRate,
    FieldName::TubingDiameter,
    FieldName::FluidDensity,
    FieldName::FluidViscosity,
    FieldName::ReservoirTemperature,
    FieldName::TotalDepth,
];

impl FieldName {
    /// All field names in report order.
    pub const ALL: [FieldName; 22] = [
        FieldName::WellName,
        FieldName::Operation,
        FieldName::StartOfOperation,
        FieldName::Duration,
        FieldName::HandOverDate,
        FieldName::TotalDepth,
        FieldName::PackerSetDepth,
        FieldName::PbrBottomDepth,
        FieldName::WellheadPressure,
        FieldName::AnnulusTestPressure,
        FieldName::ReservoirPressure,
        FieldName::PressureGradient,
        FieldName::ReservoirTemperature,
        FieldName::TubingDiameter,
        FieldName::FluidDensity,
        FieldName::FluidViscosity,
        FieldName::FlowRate,
        FieldName::ReservoirFluid,
        FieldName::HseIncidentFree,
        FieldName::EspInstalled,
        FieldName::GreString,
        FieldName::MtiLogged,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            FieldName::WellName
            | FieldName::Operation
            | FieldName::Duration
            | FieldName::ReservoirFluid => FieldKind::FreeText,
            FieldName::StartOfOperation | FieldName::HandOverDate => FieldKind::Date,
            FieldName::TotalDepth | FieldName::PackerSetDepth | FieldName::PbrBottomDepth => {
                FieldKind::Depth
            }
            FieldName::WellheadPressure
            | FieldName::AnnulusTestPressure
            | FieldName::ReservoirPressure => FieldKind::Pressure,
            FieldName::PressureGradient => FieldKind::PressureGradient,
            FieldName::ReservoirTemperature => FieldKind::Temperature,
            FieldName::TubingDiameter => FieldKind::Diameter,
            FieldName::FluidDensity => FieldKind::Density,
            FieldName::FluidViscosity => FieldKind::Viscosity,
            FieldName::FlowRate => FieldKind::FlowRate,
            FieldName::HseIncidentFree
            | FieldName::EspInstalled
            | FieldName::GreString
            | FieldName::MtiLogged => FieldKind::Boolean,
        }
    }

    /// Machine name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::WellName => "well_name",
            FieldName::Operation => "operation",
            FieldName::StartOfOperation => "start_of_operation",
            FieldName::Duration => "duration",
            FieldName::HandOverDate => "hand_over_date",
            FieldName::TotalDepth => "total_depth",
            FieldName::PackerSetDepth => "packer_set_depth",
            FieldName::PbrBottomDepth => "pbr_bottom_depth",
            FieldName::WellheadPressure => "wellhead_pressure",
            FieldName::AnnulusTestPressure => "annulus_test_pressure",
            FieldName::ReservoirPressure => "reservoir_pressure",
            FieldName::PressureGradient => "pressure_gradient",
            FieldName::ReservoirTemperature => "reservoir_temperature",
            FieldName::TubingDiameter => "tubing_diameter",
            FieldName::FluidDensity => "fluid_density",
            FieldName::FluidViscosity => "fluid_viscosity",
            FieldName::FlowRate => "flow_rate",
            FieldName::ReservoirFluid => "reservoir_fluid",
            FieldName::HseIncidentFree => "hse_incident_free",
            FieldName::EspInstalled => "esp_installed",
            FieldName::GreString => "gre_string",
            FieldName::MtiLogged => "mti_logged",
        }
    }

    /// Human label used in Markdown tables and follow-up questions.
    pub fn label(self) -> &'static str {
        match self {
            FieldName::WellName => "Well name",
            FieldName::Operation => "Operation",
            FieldName::StartOfOperation => "Start of operation",
            FieldName::Duration => "Duration",
            FieldName::HandOverDate => "Hand-over to operations",
            FieldName::TotalDepth => "Total depth",
            FieldName::PackerSetDepth => "Packer / liner hanger set depth",
            FieldName::PbrBottomDepth => "PBR bottom depth",
            FieldName::WellheadPressure => "Wellhead pressure",
            FieldName::AnnulusTestPressure => "Annulus test pressure",
            FieldName::ReservoirPressure => "Reservoir pressure",
            FieldName::PressureGradient => "Pressure gradient",
            FieldName::ReservoirTemperature => "Reservoir temperature",
            FieldName::TubingDiameter => "Tubing diameter",
            FieldName::FluidDensity => "Fluid density",
            FieldName::FluidViscosity => "Fluid viscosity",
            FieldName::FlowRate => "Flow rate",
            FieldName::ReservoirFluid => "Reservoir fluid",
            FieldName::HseIncidentFree => "HSE incident free",
            FieldName::EspInstalled => "ESP installed",
            FieldName::GreString => "GRE string",
            FieldName::MtiLogged => "MTI logged",
        }
    }

    pub fn is_required_for_nodal(self) -> bool {
        REQUIRED_NODAL_FIELDS.contains(&self)
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Field Value
// ============================================================================

/// A normalized field value. Quantities always carry their canonical unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldValue {
    Quantity { value: f64, unit: Unit },
    Date { date: NaiveDate },
    Flag { value: bool },
    Text { text: String },
}

impl FieldValue {
    /// Numeric value for quantities.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Quantity { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Whether two values agree. Quantities agree within `tolerance_percent`
    /// relative difference; everything else must be equal.
    pub fn agrees_with(&self, other: &FieldValue, tolerance_percent: f64) -> bool {
        match (self, other) {
            (FieldValue::Quantity { value: a, .. }, FieldValue::Quantity { value: b, .. }) => {
                let scale = a.abs().max(b.abs());
                if scale < f64::EPSILON {
                    return true;
                }
                (a - b).abs() / scale * 100.0 <= tolerance_percent
            }
            (FieldValue::Text { text: a }, FieldValue::Text { text: b }) => {
                a.eq_ignore_ascii_case(b)
            }
            _ => self == other,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Quantity { value, unit } => write!(f, "{value} {unit}"),
            FieldValue::Date { date } => write!(f, "{date}"),
            FieldValue::Flag { value } => write!(f, "{}", if *value { "yes" } else { "no" }),
            FieldValue::Text { text } => f.write_str(text),
        }
    }
}

// ============================================================================
// Provenance
// ============================================================================

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Extracted,
    Override,
}

/// A candidate match that was not selected as primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternate {
    pub raw: String,
    pub value: FieldValue,
    pub source_unit: Option<Unit>,
    pub offset: usize,
    /// Passed the coarse physical range check
    pub plausible: bool,
    /// Agrees with the primary within the conflict tolerance
    pub consistent: bool,
}

/// Recorded origin of a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: ValueSource,
    /// Primary passed the coarse physical range check
    pub plausible: bool,
    pub alternates: Vec<Alternate>,
    pub notes: Vec<String>,
}

impl Provenance {
    pub fn extracted() -> Self {
        Self {
            source: ValueSource::Extracted,
            plausible: true,
            alternates: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// The report gave more than one candidate for the field, or the primary
    /// itself failed the coarse range check.
    pub fn is_conflicting(&self) -> bool {
        !self.plausible || !self.alternates.is_empty()
    }

    /// Some alternate disagrees with the primary beyond the tolerance, or the
    /// primary is implausible.
    pub fn has_disagreement(&self) -> bool {
        !self.plausible || self.alternates.iter().any(|a| !a.consistent)
    }
}

// ============================================================================
// Extracted Field
// ============================================================================

/// A typed, unit-normalized candidate produced by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name: FieldName,
    /// Matched text, as it appeared in the normalized document
    pub raw: String,
    /// Unit as written in the report (canonical value lives in `value`)
    pub source_unit: Option<Unit>,
    pub value: FieldValue,
    pub confidence: f64,
    /// Byte offset into the normalized document text
    pub offset: usize,
    pub provenance: Provenance,
}

/// A token the extractor skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionNote {
    pub field: FieldName,
    pub offset: usize,
    pub raw: String,
    /// `MALFORMED_NUMBER` for unparseable numerics, `LOW_CONFIDENCE` otherwise
    pub code: IssueCode,
    pub reason: String,
}

/// Extractor output: fields in report order plus skipped-token notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub fields: Vec<ExtractedField>,
    pub notes: Vec<ExtractionNote>,
}

impl Extraction {
    pub fn get(&self, name: FieldName) -> Option<&ExtractedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
