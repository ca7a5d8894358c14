//! Single-phase tubing hydraulics
//!
//! Pure functions, all SI unless the name says otherwise:
//! - Flow velocity from volumetric rate and inner diameter
//! - Reynolds number and flow regime
//! - Darcy friction factor (laminar, Blasius, transitional interpolation)
//! - Frictional and hydrostatic pressure drop

use std::f64::consts::PI;

use crate::config::defaults::{BLASIUS_COEFFICIENT, GRAVITY_M_S2, RE_LAMINAR_MAX, RE_TURBULENT_MIN};
use crate::types::{FlowRegime, FrictionConfidence};

const PA_PER_BAR: f64 = 100_000.0;

// ============================================================================
// Velocity & Reynolds Number
// ============================================================================

/// Mean flow velocity in a circular pipe.
///
/// Formula: v = Q / (π × D² / 4)
///
/// Where:
/// - Q = volumetric flow rate (m³/s)
/// - D = inner diameter (m)
///
/// Returns velocity in m/s
pub fn flow_velocity(flow_rate_m3_s: f64, diameter_m: f64) -> f64 {
    let area = PI * diameter_m * diameter_m / 4.0;
    flow_rate_m3_s / area
}

/// Reynolds number.
///
/// Formula: Re = ρ × v × D / μ
///
/// Where:
/// - ρ = density (kg/m³)
/// - v = velocity (m/s)
/// - D = inner diameter (m)
/// - μ = dynamic viscosity (Pa·s)
pub fn reynolds_number(density_kg_m3: f64, velocity_m_s: f64, diameter_m: f64, viscosity_pa_s: f64) -> f64 {
    density_kg_m3 * velocity_m_s * diameter_m / viscosity_pa_s
}

/// Classify the flow regime from the Reynolds number.
///
/// - Re < 2300: laminar
/// - 2300 ≤ Re < 4000: transitional
/// - Re ≥ 4000: turbulent
pub fn classify_regime(reynolds: f64) -> FlowRegime {
    if reynolds < RE_LAMINAR_MAX {
        FlowRegime::Laminar
    } else if reynolds < RE_TURBULENT_MIN {
        FlowRegime::Transitional
    } else {
        FlowRegime::Turbulent
    }
}

// ============================================================================
// Friction
// ============================================================================

/// Blasius smooth-pipe correlation: f = 0.316 × Re^-0.25
fn blasius(reynolds: f64) -> f64 {
    BLASIUS_COEFFICIENT * reynolds.powf(-0.25)
}

/// Darcy friction factor for a smooth pipe.
///
/// - Laminar: f = 64 / Re
/// - Turbulent: f = 0.316 × Re^-0.25 (Blasius)
/// - Transitional: straight line between f(2300) = 64/2300 and the Blasius
///   value at Re = 4000. This is an engineering approximation, so the result
///   carries `FrictionConfidence::Low`.
///
/// Caller guarantees `reynolds` is finite and positive.
pub fn friction_factor(reynolds: f64) -> (f64, FrictionConfidence) {
    match classify_regime(reynolds) {
        FlowRegime::Laminar => (64.0 / reynolds, FrictionConfidence::Standard),
        FlowRegime::Turbulent => (blasius(reynolds), FrictionConfidence::Standard),
        FlowRegime::Transitional => {
            let f_lo = 64.0 / RE_LAMINAR_MAX;
            let f_hi = blasius(RE_TURBULENT_MIN);
            let t = (reynolds - RE_LAMINAR_MAX) / (RE_TURBULENT_MIN - RE_LAMINAR_MAX);
            (f_lo + t * (f_hi - f_lo), FrictionConfidence::Low)
        }
    }
}

// ============================================================================
// Pressure Drops
// ============================================================================

/// Frictional pressure drop over a pipe length (Darcy-Weisbach).
///
/// Formula: ΔP = f × (L / D) × ρ × v² / 2
///
/// Returns ΔP in bar
pub fn friction_drop_bar(
    friction_factor: f64,
    length_m: f64,
    diameter_m: f64,
    density_kg_m3: f64,
    velocity_m_s: f64,
) -> f64 {
    let pa = friction_factor * (length_m / diameter_m) * density_kg_m3 * velocity_m_s * velocity_m_s / 2.0;
    pa / PA_PER_BAR
}

/// Hydrostatic pressure of a fluid column.
///
/// Formula: ΔP = ρ × g × L, g = 9.80665 m/s²
///
/// Returns ΔP in bar
pub fn hydrostatic_drop_bar(density_kg_m3: f64, length_m: f64) -> f64 {
    density_kg_m3 * GRAVITY_M_S2 * length_m / PA_PER_BAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_velocity() {
        // 1 m³/s through a 1 m² section
        let d = (4.0 / PI).sqrt();
        assert!((flow_velocity(1.0, d) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_regime_boundaries() {
        assert_eq!(classify_regime(2299.999), FlowRegime::Laminar);
        assert_eq!(classify_regime(2300.0), FlowRegime::Transitional);
        assert_eq!(classify_regime(3999.999), FlowRegime::Transitional);
        assert_eq!(classify_regime(4000.0), FlowRegime::Turbulent);
    }

    #[test]
    fn test_laminar_friction_is_64_over_re() {
        for re in [10.0, 500.0, 1000.0, 2299.0] {
            let (f, conf) = friction_factor(re);
            assert!((f - 64.0 / re).abs() < 1e-12);
            assert_eq!(conf, FrictionConfidence::Standard);
        }
    }

    #[test]
    fn test_turbulent_friction_is_blasius() {
        for re in [4000.0, 10_000.0, 101_535.0, 1.0e6] {
            let (f, conf) = friction_factor(re);
            assert!((f - 0.316 * re.powf(-0.25)).abs() < 1e-12);
            assert_eq!(conf, FrictionConfidence::Standard);
        }
    }

    #[test]
    fn test_transitional_interpolates_between_endpoints() {
        let (f_start, conf) = friction_factor(2300.0);
        assert!((f_start - 64.0 / 2300.0).abs() < 1e-12);
        assert_eq!(conf, FrictionConfidence::Low);

        let (f_mid, _) = friction_factor(3150.0);
        let expected = (64.0 / 2300.0 + 0.316 * 4000f64.powf(-0.25)) / 2.0;
        assert!((f_mid - expected).abs() < 1e-12);

        // Continuous into the turbulent branch
        let (f_edge, _) = friction_factor(3999.9999);
        assert!((f_edge - 0.316 * 4000f64.powf(-0.25)).abs() < 1e-6);
    }

    #[test]
    fn test_hydrostatic_water_column() {
        // 10 m of 1000 kg/m³ ≈ 0.980665 bar
        assert!((hydrostatic_drop_bar(1000.0, 10.0) - 0.980_665).abs() < 1e-9);
    }

    #[test]
    fn test_hydrostatic_monotonic_in_depth_and_density() {
        let mut prev = 0.0;
        for depth in [0.0, 100.0, 1000.0, 2420.0, 5000.0] {
            let dp = hydrostatic_drop_bar(1050.0, depth);
            assert!(dp >= prev);
            prev = dp;
        }
        let mut prev = 0.0;
        for rho in [600.0, 800.0, 1000.0, 1500.0, 2200.0] {
            let dp = hydrostatic_drop_bar(rho, 2420.0);
            assert!(dp > prev);
            prev = dp;
        }
    }

    #[test]
    fn test_friction_drop_scales_with_velocity_squared() {
        let a = friction_drop_bar(0.02, 1000.0, 0.1, 1000.0, 1.0);
        let b = friction_drop_bar(0.02, 1000.0, 0.1, 1000.0, 2.0);
        assert!((b / a - 4.0).abs() < 1e-12);
        // 0.02 × 10000 × 1000 × 1 / 2 = 100000 Pa = 1 bar
        assert!((a - 1.0).abs() < 1e-12);
    }
}
