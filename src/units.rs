//! Unit normalization for completion-report quantities
//!
//! Every quantity stored in a `ParameterSet` uses the canonical unit of its
//! field kind. Alternate units seen in reports are converted with the fixed
//! constants below.
//!
//! | Kind              | Canonical | Alternates                  |
//! |-------------------|-----------|-----------------------------|
//! | Depth             | m         | ft                          |
//! | Pressure          | bar       | psi, kPa, MPa               |
//! | Pressure gradient | bar/m     | psi/ft                      |
//! | Temperature       | °C        | °F                          |
//! | Diameter          | in        | mm                          |
//! | Density           | kg/m³     | g/cm³ (sg), ppg             |
//! | Viscosity         | cP        | Pa·s                        |
//! | Flow rate         | m³/h      | m³/d, bbl/d, L/min          |

use serde::{Deserialize, Serialize};

use crate::types::FieldKind;

// ============================================================================
// Conversion Constants
// ============================================================================

/// Feet to metres (exact by definition)
pub const FT_TO_M: f64 = 0.3048;
/// PSI to bar
pub const PSI_TO_BAR: f64 = 0.068_947_572_9;
/// Kilopascals to bar
pub const KPA_TO_BAR: f64 = 0.01;
/// Megapascals to bar
pub const MPA_TO_BAR: f64 = 10.0;
/// psi/ft to bar/m
pub const PSI_FT_TO_BAR_M: f64 = PSI_TO_BAR / FT_TO_M;
/// Inches to millimetres (exact by definition)
pub const IN_TO_MM: f64 = 25.4;
/// Grams per cm³ to kg/m³
pub const GCM3_TO_KGM3: f64 = 1000.0;
/// Pounds per US gallon to kg/m³
pub const PPG_TO_KGM3: f64 = 119.826_427;
/// Pascal-seconds to centipoise
pub const PAS_TO_CP: f64 = 1000.0;
/// Cubic metres per day to cubic metres per hour
pub const M3D_TO_M3H: f64 = 1.0 / 24.0;
/// Oilfield barrel to cubic metres
pub const BBL_TO_M3: f64 = 0.158_987_294_928;
/// Barrels per day to cubic metres per hour
pub const BBLD_TO_M3H: f64 = BBL_TO_M3 / 24.0;
/// Litres per minute to cubic metres per hour
pub const LMIN_TO_M3H: f64 = 0.06;

/// Convert Fahrenheit to Celsius
fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Convert Celsius to Fahrenheit
fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

// ============================================================================
// Unit
// ============================================================================

/// A physical unit recognized in report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Metre,
    Foot,
    Bar,
    Psi,
    KiloPascal,
    MegaPascal,
    BarPerMetre,
    PsiPerFoot,
    Celsius,
    Fahrenheit,
    Inch,
    Millimetre,
    KgPerCubicMetre,
    GramPerCubicCentimetre,
    PoundPerGallon,
    Centipoise,
    PascalSecond,
    CubicMetrePerHour,
    CubicMetrePerDay,
    BarrelPerDay,
    LitrePerMinute,
}

impl Unit {
    /// Display symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Metre => "m",
            Unit::Foot => "ft",
            Unit::Bar => "bar",
            Unit::Psi => "psi",
            Unit::KiloPascal => "kPa",
            Unit::MegaPascal => "MPa",
            Unit::BarPerMetre => "bar/m",
            Unit::PsiPerFoot => "psi/ft",
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
            Unit::Inch => "in",
            Unit::Millimetre => "mm",
            Unit::KgPerCubicMetre => "kg/m³",
            Unit::GramPerCubicCentimetre => "g/cm³",
            Unit::PoundPerGallon => "ppg",
            Unit::Centipoise => "cP",
            Unit::PascalSecond => "Pa·s",
            Unit::CubicMetrePerHour => "m³/h",
            Unit::CubicMetrePerDay => "m³/d",
            Unit::BarrelPerDay => "bbl/d",
            Unit::LitrePerMinute => "L/min",
        }
    }

    /// The field kind this unit measures.
    pub fn kind(self) -> FieldKind {
        match self {
            Unit::Metre | Unit::Foot => FieldKind::Depth,
            Unit::Bar | Unit::Psi | Unit::KiloPascal | Unit::MegaPascal => FieldKind::Pressure,
            Unit::BarPerMetre | Unit::PsiPerFoot => FieldKind::PressureGradient,
            Unit::Celsius | Unit::Fahrenheit => FieldKind::Temperature,
            Unit::Inch | Unit::Millimetre => FieldKind::Diameter,
            Unit::KgPerCubicMetre | Unit::GramPerCubicCentimetre | Unit::PoundPerGallon => {
                FieldKind::Density
            }
            Unit::Centipoise | Unit::PascalSecond => FieldKind::Viscosity,
            Unit::CubicMetrePerHour
            | Unit::CubicMetrePerDay
            | Unit::BarrelPerDay
            | Unit::LitrePerMinute => FieldKind::FlowRate,
        }
    }

    /// Whether this unit is the canonical unit of its kind.
    pub fn is_canonical(self) -> bool {
        canonical_unit(self.kind()) == Some(self)
    }

    /// Convert a value expressed in `self` to the canonical unit of its kind.
    pub fn to_canonical(self, value: f64) -> f64 {
        match self {
            Unit::Metre
            | Unit::Bar
            | Unit::BarPerMetre
            | Unit::Celsius
            | Unit::Inch
            | Unit::KgPerCubicMetre
            | Unit::Centipoise
            | Unit::CubicMetrePerHour => value,
            Unit::Foot => value * FT_TO_M,
            Unit::Psi => value * PSI_TO_BAR,
            Unit::KiloPascal => value * KPA_TO_BAR,
            Unit::MegaPascal => value * MPA_TO_BAR,
            Unit::PsiPerFoot => value * PSI_FT_TO_BAR_M,
            Unit::Fahrenheit => fahrenheit_to_celsius(value),
            Unit::Millimetre => value / IN_TO_MM,
            Unit::GramPerCubicCentimetre => value * GCM3_TO_KGM3,
            Unit::PoundPerGallon => value * PPG_TO_KGM3,
            Unit::PascalSecond => value * PAS_TO_CP,
            Unit::CubicMetrePerDay => value * M3D_TO_M3H,
            Unit::BarrelPerDay => value * BBLD_TO_M3H,
            Unit::LitrePerMinute => value * LMIN_TO_M3H,
        }
    }

    /// Convert a canonical value into `self`.
    pub fn from_canonical(self, value: f64) -> f64 {
        match self {
            Unit::Metre
            | Unit::Bar
            | Unit::BarPerMetre
            | Unit::Celsius
            | Unit::Inch
            | Unit::KgPerCubicMetre
            | Unit::Centipoise
            | Unit::CubicMetrePerHour => value,
            Unit::Foot => value / FT_TO_M,
            Unit::Psi => value / PSI_TO_BAR,
            Unit::KiloPascal => value / KPA_TO_BAR,
            Unit::MegaPascal => value / MPA_TO_BAR,
            Unit::PsiPerFoot => value / PSI_FT_TO_BAR_M,
            Unit::Fahrenheit => celsius_to_fahrenheit(value),
            Unit::Millimetre => value * IN_TO_MM,
            Unit::GramPerCubicCentimetre => value / GCM3_TO_KGM3,
            Unit::PoundPerGallon => value / PPG_TO_KGM3,
            Unit::PascalSecond => value / PAS_TO_CP,
            Unit::CubicMetrePerDay => value / M3D_TO_M3H,
            Unit::BarrelPerDay => value / BBLD_TO_M3H,
            Unit::LitrePerMinute => value / LMIN_TO_M3H,
        }
    }

    /// All units of one kind, canonical first.
    pub fn variants_of(kind: FieldKind) -> &'static [Unit] {
        match kind {
            FieldKind::Depth => &[Unit::Metre, Unit::Foot],
            FieldKind::Pressure => &[Unit::Bar, Unit::Psi, Unit::KiloPascal, Unit::MegaPascal],
            FieldKind::PressureGradient => &[Unit::BarPerMetre, Unit::PsiPerFoot],
            FieldKind::Temperature => &[Unit::Celsius, Unit::Fahrenheit],
            FieldKind::Diameter => &[Unit::Inch, Unit::Millimetre],
            FieldKind::Density => &[
                Unit::KgPerCubicMetre,
                Unit::GramPerCubicCentimetre,
                Unit::PoundPerGallon,
            ],
            FieldKind::Viscosity => &[Unit::Centipoise, Unit::PascalSecond],
            FieldKind::FlowRate => &[
                Unit::CubicMetrePerHour,
                Unit::CubicMetrePerDay,
                Unit::BarrelPerDay,
                Unit::LitrePerMinute,
            ],
            FieldKind::Date | FieldKind::Boolean | FieldKind::FreeText => &[],
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Canonical unit for a field kind, `None` for non-quantity kinds.
pub fn canonical_unit(kind: FieldKind) -> Option<Unit> {
    Unit::variants_of(kind).first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_QUANTITY_KINDS: [FieldKind; 8] = [
        FieldKind::Depth,
        FieldKind::Pressure,
        FieldKind::PressureGradient,
        FieldKind::Temperature,
        FieldKind::Diameter,
        FieldKind::Density,
        FieldKind::Viscosity,
        FieldKind::FlowRate,
    ];

    fn rel_err(a: f64, b: f64) -> f64 {
        if b == 0.0 {
            a.abs()
        } else {
            ((a - b) / b).abs()
        }
    }

    #[test]
    fn test_round_trip_every_alternate_unit() {
        for kind in ALL_QUANTITY_KINDS {
            for &unit in Unit::variants_of(kind) {
                for canonical in [0.37, 12.5, 2420.0, 98_765.4] {
                    let there = unit.from_canonical(canonical);
                    let back = unit.to_canonical(there);
                    assert!(
                        rel_err(back, canonical) < 1e-6,
                        "{unit} round trip drifted: {canonical} -> {there} -> {back}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_bar_psi_bar() {
        let psi = Unit::Psi.from_canonical(10.0);
        assert!((psi - 145.0377).abs() < 1e-3);
        let bar = Unit::Psi.to_canonical(psi);
        assert!(rel_err(bar, 10.0) < 1e-6);
    }

    #[test]
    fn test_known_conversions() {
        assert!((Unit::Foot.to_canonical(7943.0) - 2421.0264).abs() < 1e-4);
        assert!((Unit::Fahrenheit.to_canonical(212.0) - 100.0).abs() < 1e-9);
        assert!((Unit::Millimetre.to_canonical(152.4) - 6.0).abs() < 1e-9);
        assert!((Unit::GramPerCubicCentimetre.to_canonical(1.05) - 1050.0).abs() < 1e-9);
        assert!((Unit::PascalSecond.to_canonical(0.0012) - 1.2).abs() < 1e-12);
        assert!((Unit::CubicMetrePerDay.to_canonical(1200.0) - 50.0).abs() < 1e-9);
        assert!((Unit::PsiPerFoot.to_canonical(0.433) - 0.097_95).abs() < 1e-4);
    }

    #[test]
    fn test_canonical_units() {
        assert_eq!(canonical_unit(FieldKind::Depth), Some(Unit::Metre));
        assert_eq!(canonical_unit(FieldKind::Diameter), Some(Unit::Inch));
        assert_eq!(canonical_unit(FieldKind::Date), None);
        assert!(Unit::Bar.is_canonical());
        assert!(!Unit::Psi.is_canonical());
    }
}
