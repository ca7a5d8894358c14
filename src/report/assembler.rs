//! Final report assembly

use tracing::info;

use crate::config::ReportConfig;
use crate::types::{
    AnalysisResult, NodalResult, ParameterSet, PipelineState, Readiness, RunMetadata,
    StageOutcome, ValidationReport,
};
use crate::units::canonical_unit;

/// Merges stage outputs into the single `AnalysisResult` shape.
///
/// Missing upstream output is represented by `None` and the stage outcomes;
/// assembly itself cannot fail.
pub struct ReportAssembler<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn assemble(
        &self,
        parameters: ParameterSet,
        nodal: Option<NodalResult>,
        validation: ValidationReport,
        stages: Vec<StageOutcome>,
        metadata: RunMetadata,
    ) -> AnalysisResult {
        let audit_trail = stages
            .iter()
            .flat_map(|outcome| outcome.entries.iter().cloned())
            .collect::<Vec<_>>();

        let questions = if self.config.include_questions {
            follow_up_questions(validation.readiness())
        } else {
            Vec::new()
        };

        let state = metadata
            .state_trail
            .last()
            .copied()
            .unwrap_or(PipelineState::Init);

        info!(
            run_id = %metadata.run_id,
            state = %state,
            parameters = parameters.len(),
            nodal = nodal.is_some(),
            audit_entries = audit_trail.len(),
            "Report assembled"
        );

        AnalysisResult {
            metadata,
            state,
            parameters,
            nodal,
            validation,
            stages,
            audit_trail,
            questions,
        }
    }
}

/// One question per absent required nodal input, in required order.
pub fn follow_up_questions(readiness: &Readiness) -> Vec<String> {
    readiness
        .absent
        .iter()
        .map(|field| match canonical_unit(field.kind()) {
            Some(unit) => format!("Please provide **{}** ({}).", field.label(), unit.symbol()),
            None => format!("Please provide **{}**.", field.label()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AuditEntry, DocumentSummary, FieldName, IssueCode, RawTextDocument, Severity, Stage,
        StageStatus,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn metadata(trail: Vec<PipelineState>) -> RunMetadata {
        RunMetadata {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            document: RawTextDocument::new("x").summary(),
            state_trail: trail,
        }
    }

    fn missing_diameter() -> ValidationReport {
        ValidationReport::new(
            Vec::new(),
            Readiness {
                present: Vec::new(),
                absent: vec![FieldName::TubingDiameter, FieldName::ReservoirTemperature],
                conflicting: Vec::new(),
                ready: false,
            },
        )
    }

    #[test]
    fn test_questions_name_label_and_unit() {
        let questions = follow_up_questions(missing_diameter().readiness());
        assert_eq!(
            questions,
            vec![
                "Please provide **Tubing diameter** (in).".to_string(),
                "Please provide **Reservoir temperature** (°C).".to_string(),
            ]
        );
    }

    #[test]
    fn test_questions_can_be_disabled() {
        let config = ReportConfig {
            include_questions: false,
            ..ReportConfig::default()
        };
        let result = ReportAssembler::new(&config).assemble(
            ParameterSet::default(),
            None,
            missing_diameter(),
            Vec::new(),
            metadata(vec![PipelineState::Init]),
        );
        assert!(result.questions().is_empty());
    }

    #[test]
    fn test_audit_trail_flattens_stage_entries_in_order() {
        let config = ReportConfig::default();
        let stages = vec![
            StageOutcome::new(
                Stage::Extraction,
                StageStatus::Partial,
                vec![AuditEntry::new(
                    Stage::Extraction,
                    IssueCode::MalformedNumber,
                    Severity::Warning,
                    "skipped '1.2.3'",
                )],
            ),
            StageOutcome::skipped(Stage::Calculation, crate::types::StageError::Cancelled),
        ];
        let result = ReportAssembler::new(&config).assemble(
            ParameterSet::default(),
            None,
            ValidationReport::default(),
            stages,
            metadata(vec![PipelineState::Init, PipelineState::Extracted, PipelineState::Reported]),
        );

        assert_eq!(result.state(), PipelineState::Reported);
        assert_eq!(result.audit_trail().len(), 2);
        assert_eq!(result.audit_trail()[0].code, IssueCode::MalformedNumber);
        assert_eq!(result.audit_trail()[1].code, IssueCode::Cancelled);
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_summary_carries_digest() {
        let summary: DocumentSummary = RawTextDocument::new("abc").summary();
        assert_eq!(summary.digest, "900150983cd24fb0d6963f7d28e17f72");
    }
}
