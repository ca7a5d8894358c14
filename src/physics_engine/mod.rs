//! Physics Engine Module
//!
//! Deterministic single-phase nodal analysis of a producing well.
//! All math here is closed-form physics, no fitting or iteration.
//!
//! ## Pipeline (fixed order)
//! 1. `flow_velocity()` - mean tubing velocity
//! 2. `reynolds_number()` / `classify_regime()` - flow regime
//! 3. `friction_factor()` - laminar, Blasius or transitional interpolation
//! 4. `friction_drop_bar()` / `hydrostatic_drop_bar()` - pressure drops
//! 5. Bottomhole pressure = WHP + hydrostatic + friction
//! 6. `compute_inflow()` - productivity index, max rate, utilization
//!
//! Inputs arrive in canonical report units (bar, m³/h, in, kg/m³, cP, °C, m)
//! and are converted to SI internally.

pub mod hydraulics;
pub mod inflow;

pub use hydraulics::{
    classify_regime, flow_velocity, friction_drop_bar, friction_factor, hydrostatic_drop_bar,
    reynolds_number,
};
pub use inflow::{compute_inflow, productivity_index};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{FieldName, Inflow, NodalInputs, NodalResult, REQUIRED_NODAL_FIELDS};
use crate::units::IN_TO_MM;

const SECONDS_PER_HOUR: f64 = 3600.0;
const PA_S_PER_CP: f64 = 0.001;
const M_PER_IN: f64 = IN_TO_MM / 1000.0;

// ============================================================================
// Error Type
// ============================================================================

/// Why the engine could not produce a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodalError {
    #[error("missing required input '{field}'")]
    MissingInput { field: FieldName },

    #[error("invalid input '{field}': {reason}")]
    InvalidInput { field: FieldName, reason: String },

    #[error("computation failed: {reason}")]
    Computation { reason: String },
}

// ============================================================================
// Input Checks
// ============================================================================

struct Checked {
    whp_bar: f64,
    flow_rate_m3_h: f64,
    diameter_in: f64,
    density: f64,
    viscosity_cp: f64,
    depth_m: f64,
}

fn require(inputs: &NodalInputs, field: FieldName) -> Result<f64, NodalError> {
    let value = inputs.get(field).ok_or(NodalError::MissingInput { field })?;
    if !value.is_finite() {
        return Err(NodalError::InvalidInput {
            field,
            reason: format!("value is not finite ({value})"),
        });
    }
    Ok(value)
}

fn positive(field: FieldName, value: f64) -> Result<f64, NodalError> {
    if value <= 0.0 {
        return Err(NodalError::InvalidInput {
            field,
            reason: format!("must be > 0 (got {value})"),
        });
    }
    Ok(value)
}

fn non_negative(field: FieldName, value: f64) -> Result<f64, NodalError> {
    if value < 0.0 {
        return Err(NodalError::InvalidInput {
            field,
            reason: format!("must be >= 0 (got {value})"),
        });
    }
    Ok(value)
}

fn check_inputs(inputs: &NodalInputs) -> Result<Checked, NodalError> {
    // Missing fields are reported in required order before any range check
    for field in REQUIRED_NODAL_FIELDS {
        require(inputs, field)?;
    }

    Ok(Checked {
        whp_bar: non_negative(FieldName::WellheadPressure, require(inputs, FieldName::WellheadPressure)?)?,
        flow_rate_m3_h: non_negative(FieldName::FlowRate, require(inputs, FieldName::FlowRate)?)?,
        diameter_in: positive(FieldName::TubingDiameter, require(inputs, FieldName::TubingDiameter)?)?,
        density: positive(FieldName::FluidDensity, require(inputs, FieldName::FluidDensity)?)?,
        viscosity_cp: positive(FieldName::FluidViscosity, require(inputs, FieldName::FluidViscosity)?)?,
        depth_m: positive(FieldName::TotalDepth, require(inputs, FieldName::TotalDepth)?)?,
    })
}

// ============================================================================
// Nodal Analysis
// ============================================================================

/// Compute the operating point for a complete input set.
///
/// Fails only on missing or invalid required inputs, or when the Reynolds
/// number is not a positive finite value. An inflow failure (no reservoir
/// pressure, non-positive drawdown) keeps the wellbore result and is
/// reported through `Inflow::Unavailable`.
pub fn compute(inputs: &NodalInputs) -> Result<NodalResult, NodalError> {
    let c = check_inputs(inputs)?;

    let q_m3_s = c.flow_rate_m3_h / SECONDS_PER_HOUR;
    let d_m = c.diameter_in * M_PER_IN;
    let mu_pa_s = c.viscosity_cp * PA_S_PER_CP;

    let velocity = flow_velocity(q_m3_s, d_m);
    let reynolds = reynolds_number(c.density, velocity, d_m, mu_pa_s);
    if !reynolds.is_finite() || reynolds <= 0.0 {
        return Err(NodalError::Computation {
            reason: format!("Reynolds number must be positive and finite (got {reynolds})"),
        });
    }

    let regime = classify_regime(reynolds);
    let (f, friction_confidence) = friction_factor(reynolds);
    let friction = friction_drop_bar(f, c.depth_m, d_m, c.density, velocity);
    let hydrostatic = hydrostatic_drop_bar(c.density, c.depth_m);
    let total = hydrostatic + friction;
    let bhp = c.whp_bar + total;

    for (name, value) in [("friction_drop", friction), ("bottomhole_pressure", bhp)] {
        if !value.is_finite() {
            return Err(NodalError::Computation {
                reason: format!("{name} is not finite ({value})"),
            });
        }
    }

    debug!(
        velocity_m_s = velocity,
        reynolds = reynolds,
        regime = %regime,
        friction_factor = f,
        bhp_bar = bhp,
        "Wellbore hydraulics computed"
    );

    let inflow = match compute_inflow(inputs, bhp) {
        Ok(performance) => Inflow::Computed(performance),
        Err(error) => {
            debug!(error = %error, "Inflow block unavailable");
            Inflow::Unavailable { error }
        }
    };

    Ok(NodalResult {
        velocity_m_s: velocity,
        reynolds_number: reynolds,
        flow_regime: regime,
        friction_factor: f,
        friction_confidence,
        friction_drop_bar: friction,
        hydrostatic_drop_bar: hydrostatic,
        total_drop_bar: total,
        bottomhole_pressure_bar: bhp,
        inflow,
        inputs: inputs.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlowRegime, FrictionConfidence, ReservoirPressureBasis};

    fn scenario_a() -> NodalInputs {
        NodalInputs::default()
            .with(FieldName::WellheadPressure, 10.0)
            .with(FieldName::FlowRate, 50.0)
            .with(FieldName::TubingDiameter, 6.0)
            .with(FieldName::FluidDensity, 1050.0)
            .with(FieldName::FluidViscosity, 1.2)
            .with(FieldName::ReservoirTemperature, 90.0)
            .with(FieldName::TotalDepth, 2420.0)
    }

    /// Expected values follow the formulas above; see "Scenario A figures" in DESIGN.md.
    #[test]
    fn test_scenario_a_wellbore() {
        let result = compute(&scenario_a()).unwrap();

        let d = 6.0 * 0.0254;
        let v = (50.0 / 3600.0) / (std::f64::consts::PI * d * d / 4.0);
        let re = 1050.0 * v * d / 0.0012;
        assert!((result.velocity_m_s - v).abs() < 1e-9);
        assert!((result.reynolds_number - re).abs() < 1e-6);
        assert!((result.reynolds_number - 101_535.0).abs() < 100.0);
        assert_eq!(result.flow_regime, FlowRegime::Turbulent);
        assert_eq!(result.friction_confidence, FrictionConfidence::Standard);
        assert!((result.friction_factor - 0.316 * re.powf(-0.25)).abs() < 1e-12);

        assert!((result.hydrostatic_drop_bar - 249.18).abs() < 0.01);
        assert!((result.friction_drop_bar - 0.856).abs() < 0.01);
        assert!((result.bottomhole_pressure_bar - 260.04).abs() < 0.02);
        assert!(
            (result.total_drop_bar - (result.hydrostatic_drop_bar + result.friction_drop_bar)).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_scenario_a_without_reservoir_pressure_keeps_wellbore() {
        let result = compute(&scenario_a()).unwrap();
        assert!(matches!(
            result.inflow,
            Inflow::Unavailable {
                error: NodalError::MissingInput {
                    field: FieldName::ReservoirPressure
                }
            }
        ));
        assert!(result.productivity_index().is_none());
    }

    #[test]
    fn test_inflow_with_supplied_reservoir_pressure() {
        let inputs = scenario_a().with(FieldName::ReservoirPressure, 300.0);
        let result = compute(&inputs).unwrap();
        let perf = result.inflow.performance().unwrap();
        let expected_pi = 50.0 / (300.0 - result.bottomhole_pressure_bar);
        assert!((perf.productivity_index - expected_pi).abs() < 1e-9);
        assert!((perf.max_flow_rate_m3_h - expected_pi * 300.0).abs() < 1e-6);
        assert_eq!(perf.basis, ReservoirPressureBasis::Supplied);
    }

    #[test]
    fn test_overpressured_bottomhole_reports_computation_error() {
        let inputs = scenario_a().with(FieldName::ReservoirPressure, 200.0);
        let result = compute(&inputs).unwrap();
        assert!(matches!(
            result.inflow,
            Inflow::Unavailable {
                error: NodalError::Computation { .. }
            }
        ));
        assert!(result.bottomhole_pressure_bar.is_finite());
    }

    #[test]
    fn test_missing_input_is_first_in_required_order() {
        let mut inputs = scenario_a();
        inputs.tubing_inner_diameter_in = None;
        inputs.depth_m = None;
        assert_eq!(
            compute(&inputs).unwrap_err(),
            NodalError::MissingInput {
                field: FieldName::TubingDiameter
            }
        );
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let cases = [
            (FieldName::FluidViscosity, 0.0),
            (FieldName::FluidDensity, -1.0),
            (FieldName::TubingDiameter, 0.0),
            (FieldName::TotalDepth, 0.0),
            (FieldName::FlowRate, -5.0),
            (FieldName::WellheadPressure, f64::NAN),
        ];
        for (field, value) in cases {
            let err = compute(&scenario_a().with(field, value)).unwrap_err();
            assert!(
                matches!(err, NodalError::InvalidInput { field: f, .. } if f == field),
                "{field} = {value} should be invalid, got {err:?}"
            );
        }
    }

    #[test]
    fn test_zero_flow_is_computation_error() {
        let err = compute(&scenario_a().with(FieldName::FlowRate, 0.0)).unwrap_err();
        assert!(matches!(err, NodalError::Computation { .. }));
    }

    #[test]
    fn test_high_viscosity_gives_laminar() {
        let inputs = scenario_a().with(FieldName::FluidViscosity, 200.0);
        let result = compute(&inputs).unwrap();
        assert_eq!(result.flow_regime, FlowRegime::Laminar);
        assert!((result.friction_factor - 64.0 / result.reynolds_number).abs() < 1e-12);
    }

    #[test]
    fn test_nodal_error_serializes_with_kind() {
        let err = NodalError::MissingInput {
            field: FieldName::TubingDiameter,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "missing_input");
        assert_eq!(json["field"], "tubing_diameter");
    }
}
