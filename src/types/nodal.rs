//! Nodal analysis inputs and results

use serde::{Deserialize, Serialize};

use super::FieldName;

// ============================================================================
// Inputs
// ============================================================================

/// Nodal analysis inputs in canonical units.
///
/// Every field is optional so the same shape doubles as the caller's override
/// document; the engine refuses to compute unless all required quantities are
/// present. Reservoir pressure may be supplied directly or derived from a
/// pressure gradient and the depth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodalInputs {
    pub wellhead_pressure_bar: Option<f64>,
    pub flow_rate_m3_h: Option<f64>,
    #[serde(alias = "tubing_diameter_in")]
    pub tubing_inner_diameter_in: Option<f64>,
    pub fluid_density_kg_m3: Option<f64>,
    #[serde(alias = "fluid_viscosity_cP")]
    pub fluid_viscosity_cp: Option<f64>,
    pub reservoir_temperature_c: Option<f64>,
    pub depth_m: Option<f64>,
    pub reservoir_pressure_bar: Option<f64>,
    pub pressure_gradient_bar_m: Option<f64>,
}

impl NodalInputs {
    /// Value slot for a field name, `None` if the field is not a nodal input.
    pub fn get(&self, field: FieldName) -> Option<f64> {
        match field {
            FieldName::WellheadPressure => self.wellhead_pressure_bar,
            FieldName::FlowRate => self.flow_rate_m3_h,
            FieldName::TubingDiameter => self.tubing_inner_diameter_in,
            FieldName::FluidDensity => self.fluid_density_kg_m3,
            FieldName::FluidViscosity => self.fluid_viscosity_cp,
            FieldName::ReservoirTemperature => self.reservoir_temperature_c,
            FieldName::TotalDepth => self.depth_m,
            FieldName::ReservoirPressure => self.reservoir_pressure_bar,
            FieldName::PressureGradient => self.pressure_gradient_bar_m,
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: FieldName) -> Option<&mut Option<f64>> {
        match field {
            FieldName::WellheadPressure => Some(&mut self.wellhead_pressure_bar),
            FieldName::FlowRate => Some(&mut self.flow_rate_m3_h),
            FieldName::TubingDiameter => Some(&mut self.tubing_inner_diameter_in),
            FieldName::FluidDensity => Some(&mut self.fluid_density_kg_m3),
            FieldName::FluidViscosity => Some(&mut self.fluid_viscosity_cp),
            FieldName::ReservoirTemperature => Some(&mut self.reservoir_temperature_c),
            FieldName::TotalDepth => Some(&mut self.depth_m),
            FieldName::ReservoirPressure => Some(&mut self.reservoir_pressure_bar),
            FieldName::PressureGradient => Some(&mut self.pressure_gradient_bar_m),
            _ => None,
        }
    }

    /// Builder-style setter used by tests and the override loader.
    #[must_use]
    pub fn with(mut self, field: FieldName, value: f64) -> Self {
        if let Some(slot) = self.slot_mut(field) {
            *slot = Some(value);
        }
        self
    }

    /// Fields that participate in nodal inputs, required ones first.
    pub const FIELDS: [FieldName; 9] = [
        FieldName::WellheadPressure,
        FieldName::FlowRate,
        FieldName::TubingDiameter,
        FieldName::FluidDensity,
        FieldName::FluidViscosity,
        FieldName::ReservoirTemperature,
        FieldName::TotalDepth,
        FieldName::ReservoirPressure,
        FieldName::PressureGradient,
    ];

    /// Fields that carry a value.
    pub fn populated(&self) -> Vec<FieldName> {
        Self::FIELDS
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }
}

// ============================================================================
// Results
// ============================================================================

/// Flow regime, a pure function of the Reynolds number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRegime {
    /// Re < 2300
    Laminar,
    /// 2300 ≤ Re < 4000
    Transitional,
    /// Re ≥ 4000
    Turbulent,
}

impl std::fmt::Display for FlowRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowRegime::Laminar => write!(f, "laminar"),
            FlowRegime::Transitional => write!(f, "transitional"),
            FlowRegime::Turbulent => write!(f, "turbulent"),
        }
    }
}

/// Reliability of the friction factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionConfidence {
    /// Laminar (64/Re) or Blasius correlation
    Standard,
    /// Transitional interpolation (engineering approximation)
    Low,
}

/// How the reservoir pressure used for inflow was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservoirPressureBasis {
    Supplied,
    DerivedFromGradient,
}

/// Linear IPR outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflowPerformance {
    pub reservoir_pressure_bar: f64,
    pub basis: ReservoirPressureBasis,
    /// m³/h per bar of drawdown
    pub productivity_index: f64,
    pub max_flow_rate_m3_h: f64,
    pub utilization_percent: f64,
}

/// Inflow block of a nodal result: computed, or the typed reason it is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Inflow {
    Computed(InflowPerformance),
    Unavailable {
        error: crate::physics_engine::NodalError,
    },
}

impl Inflow {
    pub fn performance(&self) -> Option<&InflowPerformance> {
        match self {
            Inflow::Computed(p) => Some(p),
            Inflow::Unavailable { .. } => None,
        }
    }
}

/// Wellbore hydraulics and inflow at the stated operating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodalResult {
    pub velocity_m_s: f64,
    pub reynolds_number: f64,
    pub flow_regime: FlowRegime,
    pub friction_factor: f64,
    pub friction_confidence: FrictionConfidence,
    pub friction_drop_bar: f64,
    pub hydrostatic_drop_bar: f64,
    pub total_drop_bar: f64,
    pub bottomhole_pressure_bar: f64,
    pub inflow: Inflow,
    /// Inputs the result was computed from
    pub inputs: NodalInputs,
}

impl NodalResult {
    pub fn productivity_index(&self) -> Option<f64> {
        self.inflow.performance().map(|p| p.productivity_index)
    }

    pub fn reservoir_pressure_bar(&self) -> Option<f64> {
        self.inflow.performance().map(|p| p.reservoir_pressure_bar)
    }

    pub fn max_flow_rate_m3_h(&self) -> Option<f64> {
        self.inflow.performance().map(|p| p.max_flow_rate_m3_h)
    }

    pub fn utilization_percent(&self) -> Option<f64> {
        self.inflow.performance().map(|p| p.utilization_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_json_schema_keys() {
        let json = r#"{
            "wellhead_pressure_bar": 18.0,
            "flow_rate_m3_h": 135.0,
            "tubing_inner_diameter_in": 6.2,
            "fluid_density_kg_m3": 1015.0,
            "fluid_viscosity_cP": 0.78,
            "reservoir_temperature_c": 90.0,
            "depth_m": null
        }"#;
        let inputs: NodalInputs = serde_json::from_str(json).unwrap();
        assert_eq!(inputs.fluid_viscosity_cp, Some(0.78));
        assert_eq!(inputs.tubing_inner_diameter_in, Some(6.2));
        assert_eq!(inputs.depth_m, None);
        assert_eq!(inputs.populated().len(), 6);
    }

    #[test]
    fn test_with_ignores_non_nodal_fields() {
        let inputs = NodalInputs::default().with(FieldName::WellName, 1.0);
        assert_eq!(inputs, NodalInputs::default());
    }
}
