//! Extraction Regression Tests
//!
//! Runs the sample end-of-well report in tests/data through the text source,
//! the extractor and the full pipeline. Units in the sample are deliberately
//! mixed (psi, °F, sg, bbl/d, kPa) to pin down normalization.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use completion_analyzer::pipeline::{PlainTextSource, TextSource};
use completion_analyzer::units::{BBLD_TO_M3H, FT_TO_M, PSI_TO_BAR};
use completion_analyzer::{
    AnalysisConfig, AnalysisContext, Extraction, FieldName, FieldValue, Orchestrator,
    ParameterExtractor, PatternRegistry, Stage, StageStatus, Unit,
};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/completion_report.txt")
}

fn extract_sample() -> Extraction {
    let document = PlainTextSource
        .extract(&sample_path())
        .expect("sample report is readable");
    let registry = PatternRegistry::new().unwrap();
    let config = AnalysisConfig::default();
    ParameterExtractor::new(&registry, &config.extraction).extract(&document)
}

fn quantity(ex: &Extraction, field: FieldName) -> f64 {
    ex.get(field)
        .and_then(|f| f.value.as_f64())
        .unwrap_or_else(|| panic!("{field} not extracted"))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * b.abs().max(1.0)
}

#[test]
fn sample_required_nodal_inputs() {
    let ex = extract_sample();

    assert!(close(quantity(&ex, FieldName::TotalDepth), 3420.0));
    assert!(close(quantity(&ex, FieldName::WellheadPressure), 22.0));
    assert!(close(quantity(&ex, FieldName::FlowRate), 6000.0 * BBLD_TO_M3H));
    assert!(close(quantity(&ex, FieldName::TubingDiameter), 6.184));
    assert!(close(quantity(&ex, FieldName::FluidDensity), 1030.0));
    assert!(close(quantity(&ex, FieldName::FluidViscosity), 0.9));
    assert!(close(quantity(&ex, FieldName::ReservoirTemperature), 90.0));
    assert!(close(quantity(&ex, FieldName::ReservoirPressure), 5400.0 * PSI_TO_BAR));
}

#[test]
fn sample_source_units_are_recorded() {
    let ex = extract_sample();
    let unit = |f| ex.get(f).and_then(|e| e.source_unit);

    assert_eq!(unit(FieldName::ReservoirPressure), Some(Unit::Psi));
    assert_eq!(unit(FieldName::ReservoirTemperature), Some(Unit::Fahrenheit));
    assert_eq!(unit(FieldName::FluidDensity), Some(Unit::GramPerCubicCentimetre));
    assert_eq!(unit(FieldName::FlowRate), Some(Unit::BarrelPerDay));
    assert_eq!(unit(FieldName::WellheadPressure), Some(Unit::KiloPascal));
}

#[test]
fn sample_depth_alternate_in_feet_is_consistent() {
    let ex = extract_sample();
    let depth = ex.get(FieldName::TotalDepth).unwrap();

    assert_eq!(depth.source_unit, Some(Unit::Metre));
    assert_eq!(depth.provenance.alternates.len(), 1);
    let alt = &depth.provenance.alternates[0];
    assert_eq!(alt.source_unit, Some(Unit::Foot));
    assert!(close(alt.value.as_f64().unwrap(), 11220.0 * FT_TO_M));
    assert!(alt.consistent);
    assert!(depth.provenance.is_conflicting());
    assert!(!depth.provenance.has_disagreement());
}

#[test]
fn sample_metadata_fields() {
    let ex = extract_sample();
    let text = |f| ex.get(f).map(|e| e.value.to_string());

    assert_eq!(text(FieldName::WellName).as_deref(), Some("15/9-F-11 B"));
    assert_eq!(text(FieldName::Operation).as_deref(), Some("Completion"));
    assert_eq!(text(FieldName::Duration).as_deref(), Some("14 days"));
    assert_eq!(text(FieldName::ReservoirFluid).as_deref(), Some("Brine 1.03 sg"));
    assert_eq!(
        ex.get(FieldName::StartOfOperation).map(|e| e.value.clone()),
        Some(FieldValue::Date {
            date: NaiveDate::from_ymd_opt(2021, 3, 12).unwrap()
        })
    );
    assert_eq!(
        ex.get(FieldName::HandOverDate).map(|e| e.value.clone()),
        Some(FieldValue::Date {
            date: NaiveDate::from_ymd_opt(2021, 3, 26).unwrap()
        })
    );
    assert!(close(quantity(&ex, FieldName::PackerSetDepth), 3105.0));
    assert!(close(quantity(&ex, FieldName::PbrBottomDepth), 3380.0));
    assert!(close(quantity(&ex, FieldName::AnnulusTestPressure), 345.0));
}

#[test]
fn sample_keyword_flags() {
    let ex = extract_sample();
    for field in [
        FieldName::HseIncidentFree,
        FieldName::EspInstalled,
        FieldName::GreString,
        FieldName::MtiLogged,
    ] {
        assert_eq!(
            ex.get(field).map(|e| e.value.clone()),
            Some(FieldValue::Flag { value: true }),
            "{field}"
        );
    }
}

#[test]
fn sample_has_no_skipped_tokens() {
    let ex = extract_sample();
    assert!(ex.notes.is_empty(), "unexpected notes: {:?}", ex.notes);
}

#[test]
fn sample_full_pipeline_computes_inflow() {
    let context = Arc::new(AnalysisContext::new(AnalysisConfig::default()).unwrap());
    let document = PlainTextSource.extract(&sample_path()).unwrap();
    let result = Orchestrator::new(context).run_analysis(document, None);

    assert_eq!(result.exit_code(), 0);
    assert_eq!(
        result.stage(Stage::Calculation).map(|o| o.status.clone()),
        Some(StageStatus::Success)
    );
    let nodal = result.nodal().unwrap();
    assert!(nodal.productivity_index().unwrap() > 0.0);
    assert!(nodal.bottomhole_pressure_bar < nodal.reservoir_pressure_bar().unwrap());
}
