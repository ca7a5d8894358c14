//! Orchestrator - staged analysis of one completion report
//!
//! ```text
//! STAGE 1: Extraction   (text → typed candidates + notes)
//! STAGE 2: Validation   (bounds, conflicts, overrides, readiness)
//! STAGE 3: Calculation  (nodal engine, ONLY if readiness holds)
//! STAGE 4: Reporting    (always runs, assembles the AnalysisResult)
//! ```
//!
//! A failing stage is terminal for that stage only: the run continues to
//! Reporting with the stage marked unavailable. The single fatal condition is
//! a document with no usable text, which aborts before any stage runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use super::source::{SourceError, TextSource};
use super::state::RunTracker;
use super::AnalysisContext;
use crate::extraction::ParameterExtractor;
use crate::physics_engine::{self, NodalError};
use crate::report::ReportAssembler;
use crate::types::{
    AnalysisResult, AuditEntry, Extraction, Inflow, IssueCode, NodalInputs, NodalResult,
    ParameterSet, PipelineState, RawTextDocument, RunMetadata, Severity, Stage, StageError,
    StageOutcome, StageStatus, ValidationReport, REQUIRED_NODAL_FIELDS,
};
use crate::validation::{nodal_inputs, ValidationGate};

/// Runs the four analysis stages over a document.
///
/// Holds only the shared immutable context, so one orchestrator can serve
/// any number of concurrent runs.
pub struct Orchestrator {
    context: Arc<AnalysisContext>,
    cancel: Option<CancellationToken>,
}

impl Orchestrator {
    pub fn new(context: Arc<AnalysisContext>) -> Self {
        Self {
            context,
            cancel: None,
        }
    }

    /// Stop scheduling further stages once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.context
    }

    /// Analyse one document. Always returns a result; failures are recorded in
    /// the stage outcomes and the audit trail.
    pub fn run_analysis(
        &self,
        document: RawTextDocument,
        overrides: Option<&NodalInputs>,
    ) -> AnalysisResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", run_id = %run_id);
        let _enter = span.enter();

        let summary = document.summary();
        info!(
            source = summary.source.as_deref().unwrap_or("<inline>"),
            characters = summary.characters,
            used_ocr = summary.used_ocr,
            confidence = summary.confidence,
            digest = %summary.digest,
            "Analysis started"
        );

        let mut tracker = RunTracker::new();
        let mut stages: Vec<StageOutcome> = Vec::with_capacity(Stage::ORDER.len());

        if document.is_blank() {
            let reason = if document.text().is_empty() {
                "document contains no text"
            } else {
                "document contains only whitespace"
            };
            warn!(reason, "Aborting: no usable text");
            self.advance(&mut tracker, PipelineState::Failed);

            let error = StageError::ExtractionEmpty {
                reason: reason.to_string(),
            };
            stages.extend(
                Stage::ORDER
                    .iter()
                    .map(|stage| StageOutcome::skipped(*stage, error.clone())),
            );
            if let Some(first) = stages.first_mut() {
                first.entries.push(AuditEntry::new(
                    Stage::Extraction,
                    IssueCode::ExtractionEmpty,
                    Severity::Error,
                    format!("run aborted: {reason}"),
                ));
            }
            let metadata = RunMetadata {
                run_id,
                generated_at: Utc::now(),
                document: summary,
                state_trail: tracker.into_trail(),
            };
            return ReportAssembler::new(&self.context.config.report).assemble(
                ParameterSet::default(),
                None,
                ValidationReport::default(),
                stages,
                metadata,
            );
        }

        // STAGE 1: Extraction
        let extraction = self.extract(&document, &mut stages);
        self.advance(&mut tracker, PipelineState::Extracted);

        // STAGE 2: Validation
        let mut validated: Option<(ParameterSet, ValidationReport)> = None;
        if self.is_cancelled() {
            stages.push(cancelled(Stage::Validation));
        } else {
            validated = Some(self.validate(&extraction, overrides, &mut stages));
            self.advance(&mut tracker, PipelineState::Validated);
        }

        // STAGE 3: Calculation
        let mut nodal: Option<NodalResult> = None;
        if let Some((ref params, ref mut report)) = validated {
            if self.is_cancelled() {
                stages.push(cancelled(Stage::Calculation));
            } else {
                let (outcome, result, result_issues) = self.calculate(params, report);
                let computed = result.is_some();
                nodal = result;
                *report = std::mem::take(report).with_result_issues(result_issues);
                stages.push(outcome);
                if computed {
                    self.advance(&mut tracker, PipelineState::Calculated);
                }
            }
        } else {
            stages.push(cancelled(Stage::Calculation));
        }

        // STAGE 4: Reporting
        stages.push(StageOutcome::new(Stage::Reporting, StageStatus::Success, Vec::new()));
        self.advance(&mut tracker, PipelineState::Reported);

        let (parameters, validation) = validated.unwrap_or_default();
        let metadata = RunMetadata {
            run_id,
            generated_at: Utc::now(),
            document: summary,
            state_trail: tracker.into_trail(),
        };
        let result = ReportAssembler::new(&self.context.config.report).assemble(
            parameters, nodal, validation, stages, metadata,
        );
        info!(
            state = %result.state(),
            exit_code = result.exit_code(),
            "Analysis finished"
        );
        result
    }

    /// Analyse independent documents concurrently. Results keep input order.
    pub fn run_batch(
        &self,
        documents: Vec<RawTextDocument>,
        overrides: Option<&NodalInputs>,
    ) -> Vec<AnalysisResult> {
        info!(documents = documents.len(), "Batch analysis started");
        documents
            .into_par_iter()
            .map(|doc| self.run_analysis(doc, overrides))
            .collect()
    }

    /// Read each path through `source`, then analyse the readable ones
    /// concurrently. Read errors are returned per path.
    pub fn run_files(
        &self,
        source: &dyn TextSource,
        paths: &[PathBuf],
        overrides: Option<&NodalInputs>,
    ) -> Vec<(PathBuf, Result<AnalysisResult, SourceError>)> {
        paths
            .par_iter()
            .map(|path| {
                let outcome = read_document(source, path).map(|doc| self.run_analysis(doc, overrides));
                (path.clone(), outcome)
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Stages
    // ------------------------------------------------------------------------

    fn extract(&self, document: &RawTextDocument, stages: &mut Vec<StageOutcome>) -> Extraction {
        let extractor =
            ParameterExtractor::new(&self.context.registry, &self.context.config.extraction);
        let extraction = extractor.extract(document);

        let mut entries: Vec<AuditEntry> = extraction
            .notes
            .iter()
            .map(|note| {
                AuditEntry::new(
                    Stage::Extraction,
                    note.code,
                    Severity::Warning,
                    format!("skipped '{}' at offset {}: {}", note.raw, note.offset, note.reason),
                )
                .about(note.field.as_str())
            })
            .collect();

        let min_confidence = self.context.config.extraction.min_document_confidence;
        let low_ocr = document.used_ocr() && document.confidence() < min_confidence;
        if low_ocr {
            entries.push(AuditEntry::new(
                Stage::Extraction,
                IssueCode::LowConfidence,
                Severity::Warning,
                format!(
                    "OCR confidence {:.2} below {min_confidence:.2}; extracted values are scaled down",
                    document.confidence()
                ),
            ));
        }

        let status = if extraction.is_empty() {
            entries.push(AuditEntry::new(
                Stage::Extraction,
                IssueCode::NoFieldsExtracted,
                Severity::Error,
                "no recognisable fields in the document",
            ));
            StageStatus::Failed(StageError::NoFieldsExtracted)
        } else if !extraction.notes.is_empty() || low_ocr {
            StageStatus::Partial
        } else {
            StageStatus::Success
        };

        info!(
            stage = %Stage::Extraction,
            status = status.label(),
            fields = extraction.fields.len(),
            notes = extraction.notes.len(),
            "Stage complete"
        );
        stages.push(StageOutcome::new(Stage::Extraction, status, entries));
        extraction
    }

    fn validate(
        &self,
        extraction: &Extraction,
        overrides: Option<&NodalInputs>,
        stages: &mut Vec<StageOutcome>,
    ) -> (ParameterSet, ValidationReport) {
        let gate = ValidationGate::new(&self.context.config);
        let (params, report) = gate.validate(extraction, overrides);

        let entries = report
            .issues()
            .iter()
            .map(|issue| issue.to_audit(Stage::Validation))
            .collect();
        let status = if report.has_warnings() || !report.readiness().ready {
            StageStatus::Partial
        } else {
            StageStatus::Success
        };

        info!(
            stage = %Stage::Validation,
            status = status.label(),
            parameters = params.len(),
            issues = report.issues().len(),
            ready = report.readiness().ready,
            "Stage complete"
        );
        stages.push(StageOutcome::new(Stage::Validation, status, entries));
        (params, report)
    }

    fn calculate(
        &self,
        params: &ParameterSet,
        report: &ValidationReport,
    ) -> (StageOutcome, Option<NodalResult>, Vec<crate::types::ValidationIssue>) {
        let readiness = report.readiness();
        if !readiness.ready {
            let entries = readiness
                .absent
                .iter()
                .map(|field| {
                    AuditEntry::new(
                        Stage::Calculation,
                        IssueCode::MissingField,
                        Severity::Error,
                        format!("{} is required for nodal analysis", field.label()),
                    )
                    .about(field.as_str())
                })
                .collect();
            let first = readiness
                .absent
                .first()
                .copied()
                .unwrap_or(REQUIRED_NODAL_FIELDS[0]);
            warn!(stage = %Stage::Calculation, missing = ?readiness.absent, "Nodal analysis not possible");
            let outcome = StageOutcome::new(
                Stage::Calculation,
                StageStatus::Failed(StageError::MissingField { field: first }),
                entries,
            );
            return (outcome, None, Vec::new());
        }

        let inputs = nodal_inputs(params);
        match physics_engine::compute(&inputs) {
            Ok(result) => {
                let gate = ValidationGate::new(&self.context.config);
                let issues = gate.validate_result(&result);
                let mut entries: Vec<AuditEntry> = issues
                    .iter()
                    .map(|issue| issue.to_audit(Stage::Calculation))
                    .collect();

                if let Inflow::Unavailable { ref error } = result.inflow {
                    let mut entry = AuditEntry::new(
                        Stage::Calculation,
                        IssueCode::InflowUnavailable,
                        Severity::Warning,
                        format!("inflow performance not computed: {error}"),
                    );
                    if let Some(field) = nodal_error_field(error) {
                        entry = entry.about(field);
                    }
                    entries.push(entry);
                }

                let status = if entries.is_empty() {
                    StageStatus::Success
                } else {
                    StageStatus::Partial
                };
                info!(
                    stage = %Stage::Calculation,
                    status = status.label(),
                    bhp_bar = result.bottomhole_pressure_bar,
                    regime = %result.flow_regime,
                    "Stage complete"
                );
                (
                    StageOutcome::new(Stage::Calculation, status, entries),
                    Some(result),
                    issues,
                )
            }
            Err(err) => {
                error!(stage = %Stage::Calculation, error = %err, "Nodal computation failed");
                let stage_error = match err {
                    NodalError::MissingInput { field } => StageError::MissingField { field },
                    NodalError::InvalidInput { field, ref reason } => StageError::InvalidInput {
                        field,
                        reason: reason.clone(),
                    },
                    NodalError::Computation { ref reason } => StageError::Computation {
                        reason: reason.clone(),
                    },
                };
                let mut entry = AuditEntry::new(
                    Stage::Calculation,
                    stage_error.code(),
                    Severity::Error,
                    err.to_string(),
                );
                if let Some(field) = nodal_error_field(&err) {
                    entry = entry.about(field);
                }
                (
                    StageOutcome::new(Stage::Calculation, StageStatus::Failed(stage_error), vec![entry]),
                    None,
                    Vec::new(),
                )
            }
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn is_cancelled(&self) -> bool {
        let cancelled = self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled);
        if cancelled {
            info!("Cancellation requested, skipping remaining stages");
        }
        cancelled
    }

    fn advance(&self, tracker: &mut RunTracker, next: PipelineState) {
        if let Err(e) = tracker.advance(next) {
            error!(error = %e, "State machine rejected transition");
        }
    }
}

fn cancelled(stage: Stage) -> StageOutcome {
    StageOutcome::skipped(stage, StageError::Cancelled)
}

fn nodal_error_field(error: &NodalError) -> Option<&'static str> {
    match error {
        NodalError::MissingInput { field } | NodalError::InvalidInput { field, .. } => {
            Some(field.as_str())
        }
        NodalError::Computation { .. } => None,
    }
}

fn read_document(source: &dyn TextSource, path: &Path) -> Result<RawTextDocument, SourceError> {
    let document = source.extract(path);
    if let Err(ref e) = document {
        warn!(source = source.source_name(), error = %e, "Failed to read document");
    }
    document
}
