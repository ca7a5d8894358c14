//! Linear inflow performance (straight-line IPR)

use super::NodalError;
use crate::types::{FieldName, InflowPerformance, NodalInputs, ReservoirPressureBasis};

/// Productivity index.
///
/// Formula: PI = Q / (Pr - Pwf)
///
/// Where:
/// - Q = flow rate (m³/h)
/// - Pr = reservoir pressure (bar)
/// - Pwf = flowing bottomhole pressure (bar)
///
/// Returns PI in m³/h per bar. A non-positive drawdown has no physical PI and
/// returns `NodalError::Computation`.
pub fn productivity_index(flow_rate_m3_h: f64, reservoir_pressure_bar: f64, bottomhole_pressure_bar: f64) -> Result<f64, NodalError> {
    let drawdown = reservoir_pressure_bar - bottomhole_pressure_bar;
    if !drawdown.is_finite() || drawdown <= 0.0 {
        return Err(NodalError::Computation {
            reason: format!(
                "non-positive drawdown: reservoir pressure {reservoir_pressure_bar:.2} bar <= bottomhole pressure {bottomhole_pressure_bar:.2} bar"
            ),
        });
    }
    let pi = flow_rate_m3_h / drawdown;
    if !pi.is_finite() {
        return Err(NodalError::Computation {
            reason: format!("productivity index is not finite ({pi})"),
        });
    }
    Ok(pi)
}

/// Reservoir pressure used for inflow: supplied, or gradient × depth.
fn reservoir_pressure(inputs: &NodalInputs) -> Result<(f64, ReservoirPressureBasis), NodalError> {
    if let Some(pr) = inputs.reservoir_pressure_bar {
        if !pr.is_finite() || pr <= 0.0 {
            return Err(NodalError::InvalidInput {
                field: FieldName::ReservoirPressure,
                reason: format!("must be a positive number (got {pr})"),
            });
        }
        return Ok((pr, ReservoirPressureBasis::Supplied));
    }

    match (inputs.pressure_gradient_bar_m, inputs.depth_m) {
        (Some(gradient), Some(depth)) => {
            if !gradient.is_finite() || gradient <= 0.0 {
                return Err(NodalError::InvalidInput {
                    field: FieldName::PressureGradient,
                    reason: format!("must be a positive number (got {gradient})"),
                });
            }
            Ok((gradient * depth, ReservoirPressureBasis::DerivedFromGradient))
        }
        _ => Err(NodalError::MissingInput {
            field: FieldName::ReservoirPressure,
        }),
    }
}

/// Inflow block at the computed operating point.
///
/// Max flow rate is the linear-IPR open-flow potential PI × Pr; utilization
/// is Q / max × 100.
pub fn compute_inflow(inputs: &NodalInputs, bottomhole_pressure_bar: f64) -> Result<InflowPerformance, NodalError> {
    let flow_rate = inputs.flow_rate_m3_h.ok_or(NodalError::MissingInput {
        field: FieldName::FlowRate,
    })?;
    let (pr, basis) = reservoir_pressure(inputs)?;
    let pi = productivity_index(flow_rate, pr, bottomhole_pressure_bar)?;
    let max_flow = pi * pr;
    let utilization = if max_flow > 0.0 {
        flow_rate / max_flow * 100.0
    } else {
        0.0
    };

    Ok(InflowPerformance {
        reservoir_pressure_bar: pr,
        basis,
        productivity_index: pi,
        max_flow_rate_m3_h: max_flow,
        utilization_percent: utilization,
    })
}
