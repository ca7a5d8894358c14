//! Pipeline Scenario Tests
//!
//! Drives whole documents through the Orchestrator and asserts on stage
//! outcomes, state trail, audit codes and the rendered outputs.

use std::sync::Arc;

use completion_analyzer::pipeline::{PlainTextSource, SourceError};
use completion_analyzer::types::{FlowRegime, Inflow, ValueSource};
use completion_analyzer::{
    AnalysisConfig, AnalysisContext, FieldName, IssueCode, NodalInputs, Orchestrator,
    PipelineState, RawTextDocument, Severity, Stage, StageError, StageStatus,
};
use tokio_util::sync::CancellationToken;

const SCENARIO_A: &str = "\
Well Name: 15/9-F-11
Operation: Completion
Total depth: 2420 m
Wellhead pressure: 10 bar
Flow rate: 50 m3/h
Tubing ID: 6 in
Fluid density: 1050 kg/m3
Fluid viscosity: 1.2 cP
Reservoir temperature: 90 °C
";

fn context() -> Arc<AnalysisContext> {
    Arc::new(AnalysisContext::new(AnalysisConfig::default()).expect("registry compiles"))
}

fn orchestrator() -> Orchestrator {
    Orchestrator::new(context())
}

fn status(result: &completion_analyzer::AnalysisResult, stage: Stage) -> StageStatus {
    result.stage(stage).expect("every stage has an outcome").status.clone()
}

// ============================================================================
// Scenario A: complete inputs
// ============================================================================

#[test]
fn scenario_a_complete_inputs_compute_wellbore() {
    let result = orchestrator().run_analysis(RawTextDocument::new(SCENARIO_A), None);

    assert_eq!(result.state(), PipelineState::Reported);
    assert_eq!(
        result.metadata().state_trail,
        vec![
            PipelineState::Init,
            PipelineState::Extracted,
            PipelineState::Validated,
            PipelineState::Calculated,
            PipelineState::Reported,
        ]
    );
    assert_eq!(result.count_code(IssueCode::MissingField), 0);
    assert!(result.validation().readiness().ready);
    assert!(result.questions().is_empty());

    let nodal = result.nodal().expect("nodal result computed");
    assert_eq!(nodal.flow_regime, FlowRegime::Turbulent);
    assert!((nodal.reynolds_number - 101_535.0).abs() / 101_535.0 < 0.005);
    assert!((nodal.friction_factor - 0.316 * nodal.reynolds_number.powf(-0.25)).abs() < 1e-12);
    assert!((nodal.hydrostatic_drop_bar - 249.18).abs() < 0.05);
    assert!((nodal.friction_drop_bar - 0.856).abs() < 0.01);
    assert!((nodal.bottomhole_pressure_bar - 260.04).abs() < 0.05);
}

#[test]
fn scenario_a_without_reservoir_pressure_is_partial() {
    let result = orchestrator().run_analysis(RawTextDocument::new(SCENARIO_A), None);

    assert_eq!(status(&result, Stage::Extraction), StageStatus::Success);
    assert_eq!(status(&result, Stage::Validation), StageStatus::Success);
    assert_eq!(status(&result, Stage::Calculation), StageStatus::Partial);
    assert_eq!(status(&result, Stage::Reporting), StageStatus::Success);
    assert_eq!(result.count_code(IssueCode::InflowUnavailable), 1);
    assert!(matches!(
        result.nodal().map(|n| &n.inflow),
        Some(Inflow::Unavailable { .. })
    ));
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn scenario_a_with_reservoir_pressure_computes_inflow() {
    let text = format!("{SCENARIO_A}Static reservoir pressure: 300 bar\n");
    let result = orchestrator().run_analysis(RawTextDocument::new(text), None);

    assert_eq!(status(&result, Stage::Calculation), StageStatus::Success);
    let nodal = result.nodal().unwrap();
    let pi = nodal.productivity_index().unwrap();
    let expected = 50.0 / (300.0 - nodal.bottomhole_pressure_bar);
    assert!((pi - expected).abs() < 1e-9);
    assert!((nodal.max_flow_rate_m3_h().unwrap() - pi * 300.0).abs() < 1e-9);
    assert!(nodal.utilization_percent().unwrap() < 100.0);
}

#[test]
fn reservoir_pressure_below_bhp_is_computation_issue_not_failure() {
    let text = format!("{SCENARIO_A}Static reservoir pressure: 200 bar\n");
    let result = orchestrator().run_analysis(RawTextDocument::new(text), None);

    assert_eq!(status(&result, Stage::Calculation), StageStatus::Partial);
    let nodal = result.nodal().expect("wellbore result survives");
    assert!(nodal.productivity_index().is_none());
    assert_eq!(result.count_code(IssueCode::InflowUnavailable), 1);
}

// ============================================================================
// Scenario B: a required input is missing
// ============================================================================

#[test]
fn scenario_b_missing_diameter_fails_calculation_only() {
    let text = SCENARIO_A.replace("Tubing ID: 6 in\n", "");
    let result = orchestrator().run_analysis(RawTextDocument::new(text), None);

    assert_eq!(result.state(), PipelineState::Reported);
    assert_eq!(
        status(&result, Stage::Calculation),
        StageStatus::Failed(StageError::MissingField {
            field: FieldName::TubingDiameter
        })
    );
    assert!(result.nodal().is_none());
    assert_eq!(result.count_code(IssueCode::MissingField), 1);

    // Upstream outputs are still there
    assert_eq!(result.parameters().quantity(FieldName::TotalDepth), Some(2420.0));
    assert_eq!(
        result.validation().readiness().absent,
        vec![FieldName::TubingDiameter]
    );
    assert_eq!(status(&result, Stage::Validation), StageStatus::Partial);
    assert_eq!(
        result.questions(),
        &["Please provide **Tubing diameter** (in).".to_string()]
    );
    assert_eq!(result.exit_code(), 1);
}

#[test]
fn override_fills_missing_diameter() {
    let text = SCENARIO_A.replace("Tubing ID: 6 in\n", "");
    let overrides = NodalInputs {
        tubing_inner_diameter_in: Some(6.0),
        ..NodalInputs::default()
    };
    let result = orchestrator().run_analysis(RawTextDocument::new(text), Some(&overrides));

    assert!(result.nodal().is_some());
    assert_eq!(result.count_code(IssueCode::OverrideApplied), 1);
    let entry = result.parameters().get(FieldName::TubingDiameter).unwrap();
    assert_eq!(entry.provenance.source, ValueSource::Override);
    assert_eq!(result.exit_code(), 0);
}

// ============================================================================
// Scenario C: conflicting candidates
// ============================================================================

#[test]
fn scenario_c_metre_and_feet_depths_are_reported_as_conflict() {
    let text = SCENARIO_A.replace("Total depth: 2420 m\n", "Total depth: 2420 m\nTD 7943 ft\n");
    let result = orchestrator().run_analysis(RawTextDocument::new(text), None);

    let depth = result.parameters().get(FieldName::TotalDepth).unwrap();
    assert_eq!(depth.value.as_f64(), Some(2420.0));
    assert_eq!(depth.provenance.alternates.len(), 1);
    let alt = &depth.provenance.alternates[0];
    assert!(alt.raw.contains("7943 ft"));
    assert!(alt.consistent);
    assert!(depth.flags.contains(&IssueCode::ConflictingValue));

    assert_eq!(
        result.validation().readiness().conflicting,
        vec![FieldName::TotalDepth]
    );
    let issue = result
        .validation()
        .issues_for("total_depth")
        .find(|i| i.code == IssueCode::ConflictingValue)
        .unwrap();
    assert_eq!(issue.severity, Severity::Info);
    assert_eq!(result.count_code(IssueCode::ConflictingValue), 1);

    let markdown = result.to_markdown(2);
    let row = |field: FieldName| {
        let prefix = format!("| {} |", field.label());
        markdown.lines().find(|l| l.starts_with(&prefix)).map(str::to_string)
    };
    assert!(row(FieldName::TotalDepth).unwrap().ends_with("| CONFLICTING_VALUE |"));
    assert!(row(FieldName::WellheadPressure).unwrap().ends_with("| - |"));

    // Agreeing candidates neither block nor degrade the run
    assert!(result.nodal().is_some());
    assert_eq!(status(&result, Stage::Validation), StageStatus::Success);
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn scenario_c_conflicting_depths_keep_first_and_flag() {
    let text = SCENARIO_A.replace(
        "Total depth: 2420 m\n",
        "Total depth: 2420 m (previously reported 2600 m)\n",
    );
    let result = orchestrator().run_analysis(RawTextDocument::new(text), None);

    let depth = result.parameters().get(FieldName::TotalDepth).unwrap();
    assert_eq!(depth.value.as_f64(), Some(2420.0));
    assert_eq!(depth.provenance.alternates.len(), 1);
    assert_eq!(depth.provenance.alternates[0].value.as_f64(), Some(2600.0));
    assert!(depth.flags.contains(&IssueCode::ConflictingValue));

    // Conflicts do not block the calculation
    assert_eq!(
        result.validation().readiness().conflicting,
        vec![FieldName::TotalDepth]
    );
    assert!(result.nodal().is_some());
    assert_eq!(status(&result, Stage::Validation), StageStatus::Partial);
}

// ============================================================================
// Failure paths
// ============================================================================

#[test]
fn whitespace_document_aborts_with_all_stages_skipped() {
    let result = orchestrator().run_analysis(RawTextDocument::new("  \n\t \n"), None);

    assert_eq!(result.state(), PipelineState::Failed);
    assert_eq!(result.stage_outcomes().len(), 4);
    for outcome in result.stage_outcomes() {
        assert!(matches!(
            outcome.status,
            StageStatus::Skipped(StageError::ExtractionEmpty { .. })
        ));
    }
    assert!(result.count_code(IssueCode::ExtractionEmpty) >= 1);
    assert!(result.parameters().is_empty());
    assert_eq!(result.exit_code(), 2);
}

#[test]
fn unrecognised_text_fails_extraction_and_lists_every_missing_input() {
    let result = orchestrator().run_analysis(
        RawTextDocument::new("Daily summary: crew change, weather standby.\n"),
        None,
    );

    assert_eq!(
        status(&result, Stage::Extraction),
        StageStatus::Failed(StageError::NoFieldsExtracted)
    );
    assert_eq!(result.count_code(IssueCode::MissingField), 7);
    assert_eq!(result.questions().len(), 7);
    assert_eq!(result.state(), PipelineState::Reported);
    assert_eq!(result.exit_code(), 1);
}

#[test]
fn malformed_tokens_make_extraction_partial() {
    let text = SCENARIO_A.replace("Total depth: 2420 m", "Total depth: 1.2.3 m or 2420 m");
    let result = orchestrator().run_analysis(RawTextDocument::new(text), None);

    assert_eq!(status(&result, Stage::Extraction), StageStatus::Partial);
    assert_eq!(result.count_code(IssueCode::MalformedNumber), 1);
    assert_eq!(result.parameters().quantity(FieldName::TotalDepth), Some(2420.0));
}

#[test]
fn decimal_comma_viscosity_keeps_flow_turbulent() {
    let text = SCENARIO_A.replace("Fluid viscosity: 1.2 cP", "Fluid viscosity: 0,785 cP");
    let result = orchestrator().run_analysis(RawTextDocument::new(text), None);

    assert_eq!(result.parameters().quantity(FieldName::FluidViscosity), Some(0.785));
    assert_eq!(status(&result, Stage::Extraction), StageStatus::Success);
    let nodal = result.nodal().unwrap();
    assert_eq!(nodal.flow_regime, FlowRegime::Turbulent);
    assert!((nodal.reynolds_number - 155_000.0).abs() < 1_000.0);
}

#[test]
fn low_confidence_ocr_is_partial() {
    let result = orchestrator().run_analysis(RawTextDocument::from_ocr(SCENARIO_A, 0.4), None);

    assert_eq!(status(&result, Stage::Extraction), StageStatus::Partial);
    // 0.9 * 0.4 is below the 0.5 validation threshold
    assert!(result.count_code(IssueCode::LowConfidence) >= 7);
    assert!(result.nodal().is_some());
}

#[test]
fn cancelled_run_skips_remaining_stages() {
    let token = CancellationToken::new();
    token.cancel();
    let result = orchestrator()
        .with_cancellation(token)
        .run_analysis(RawTextDocument::new(SCENARIO_A), None);

    assert_eq!(result.state(), PipelineState::Reported);
    assert_eq!(
        status(&result, Stage::Validation),
        StageStatus::Skipped(StageError::Cancelled)
    );
    assert_eq!(
        status(&result, Stage::Calculation),
        StageStatus::Skipped(StageError::Cancelled)
    );
    assert_eq!(status(&result, Stage::Reporting), StageStatus::Success);
    assert_eq!(
        result.metadata().state_trail,
        vec![PipelineState::Init, PipelineState::Extracted, PipelineState::Reported]
    );
    assert_eq!(result.exit_code(), 1);
}

// ============================================================================
// Batch and files
// ============================================================================

#[test]
fn batch_keeps_input_order() {
    let docs = vec![
        RawTextDocument::new(SCENARIO_A),
        RawTextDocument::new(""),
        RawTextDocument::new(SCENARIO_A.replace("Tubing ID: 6 in\n", "")),
    ];
    let results = orchestrator().run_batch(docs, None);

    let codes: Vec<i32> = results.iter().map(|r| r.exit_code()).collect();
    assert_eq!(codes, vec![0, 2, 1]);
    assert_ne!(results[0].metadata().run_id, results[2].metadata().run_id);
}

#[test]
fn run_files_reports_unreadable_paths() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("f11.txt");
    std::fs::write(&good, SCENARIO_A).unwrap();
    let missing = dir.path().join("missing.txt");

    let results = orchestrator().run_files(&PlainTextSource, &[good.clone(), missing], None);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, good);
    let first = results[0].1.as_ref().unwrap();
    assert_eq!(
        first.metadata().document.source.as_deref(),
        Some(good.display().to_string().as_str())
    );
    assert!(matches!(results[1].1, Err(SourceError::Io(..))));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn json_output_uses_machine_codes() {
    let text = SCENARIO_A.replace("Tubing ID: 6 in\n", "");
    let result = orchestrator().run_analysis(RawTextDocument::new(text), None);
    let json: serde_json::Value = serde_json::from_str(&result.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["state"], "reported");
    assert_eq!(json["stages"][2]["stage"], "calculation");
    assert_eq!(json["stages"][2]["status"], "failed");
    assert_eq!(json["stages"][2]["error"], "missing_field");
    assert_eq!(json["stages"][2]["field"], "tubing_diameter");
    assert_eq!(json["parameters"]["total_depth"]["value"]["value"], 2420.0);
    assert!(json["audit_trail"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["code"] == "MISSING_FIELD"));
}

#[test]
fn markdown_skeleton_sections() {
    let text = SCENARIO_A.replace("Tubing ID: 6 in\n", "");
    let result = orchestrator().run_analysis(RawTextDocument::new(text), None);
    let md = result.to_markdown(2);

    assert!(md.contains("## Extracted Parameters"));
    assert!(md.contains("| Total depth | 2420.00 m |"));
    assert!(md.contains("_Not computed: required input 'tubing_diameter' is missing._"));
    assert!(md.contains("## Missing Inputs for Nodal Analysis"));
    assert!(md.contains("- Please provide **Tubing diameter** (in)."));
    assert!(md.contains("| Calculation | failed |"));
}
