//! Validation report, stage outcomes and the final analysis result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    AuditEntry, DocumentSummary, FieldName, IssueCode, NodalResult, ParameterSet, PipelineState,
    Severity, Stage,
};

// ============================================================================
// Validation Report
// ============================================================================

/// One flagged value. The value stays in the parameter set; this only records it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field name or result quantity
    pub subject: String,
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
    pub value: Option<f64>,
    pub bounds: Option<(f64, f64)>,
}

impl ValidationIssue {
    pub fn to_audit(&self, stage: Stage) -> AuditEntry {
        AuditEntry::new(stage, self.code, self.severity, self.message.clone()).about(self.subject.clone())
    }
}

/// Readiness of the required nodal input set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
    pub present: Vec<FieldName>,
    pub absent: Vec<FieldName>,
    pub conflicting: Vec<FieldName>,
    pub ready: bool,
}

/// Everything the validation gate flagged, plus readiness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
    readiness: Readiness,
}

impl ValidationReport {
    pub fn new(issues: Vec<ValidationIssue>, readiness: Readiness) -> Self {
        Self { issues, readiness }
    }

    /// New report with the result-sanity issues appended.
    #[must_use]
    pub fn with_result_issues(self, more: Vec<ValidationIssue>) -> Self {
        let mut issues = self.issues;
        issues.extend(more);
        Self {
            issues,
            readiness: self.readiness,
        }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    pub fn issues_for(&self, subject: &str) -> impl Iterator<Item = &ValidationIssue> {
        let subject = subject.to_string();
        self.issues.iter().filter(move |i| i.subject == subject)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity >= Severity::Warning)
    }
}

// ============================================================================
// Stage Outcomes
// ============================================================================

/// Why a stage failed or did not run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum StageError {
    MissingField { field: FieldName },
    InvalidInput { field: FieldName, reason: String },
    Computation { reason: String },
    NoFieldsExtracted,
    ExtractionEmpty { reason: String },
    Cancelled,
}

impl StageError {
    pub fn code(&self) -> IssueCode {
        match self {
            StageError::MissingField { .. } => IssueCode::MissingField,
            StageError::InvalidInput { .. } => IssueCode::InvalidInput,
            StageError::Computation { .. } => IssueCode::ComputationError,
            StageError::NoFieldsExtracted => IssueCode::NoFieldsExtracted,
            StageError::ExtractionEmpty { .. } => IssueCode::ExtractionEmpty,
            StageError::Cancelled => IssueCode::Cancelled,
        }
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::MissingField { field } => write!(f, "required input '{field}' is missing"),
            StageError::InvalidInput { field, reason } => write!(f, "input '{field}' is invalid: {reason}"),
            StageError::Computation { reason } => write!(f, "computation failed: {reason}"),
            StageError::NoFieldsExtracted => write!(f, "no fields could be extracted"),
            StageError::ExtractionEmpty { reason } => write!(f, "no usable text: {reason}"),
            StageError::Cancelled => write!(f, "run cancelled by caller"),
        }
    }
}

/// Result status of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Success,
    /// Best-effort output with warnings in the audit trail
    Partial,
    /// Stage ran and failed; its output is unavailable
    Failed(StageError),
    /// Stage did not run
    Skipped(StageError),
}

impl StageStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, StageStatus::Success | StageStatus::Partial)
    }

    pub fn error(&self) -> Option<&StageError> {
        match self {
            StageStatus::Failed(e) | StageStatus::Skipped(e) => Some(e),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StageStatus::Success => "success",
            StageStatus::Partial => "partial",
            StageStatus::Failed(_) => "failed",
            StageStatus::Skipped(_) => "skipped",
        }
    }
}

/// Outcome of one pipeline stage with its audit entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: Stage,
    #[serde(flatten)]
    pub status: StageStatus,
    pub entries: Vec<AuditEntry>,
}

impl StageOutcome {
    pub fn new(stage: Stage, status: StageStatus, entries: Vec<AuditEntry>) -> Self {
        Self { stage, status, entries }
    }

    pub fn skipped(stage: Stage, reason: StageError) -> Self {
        let entry = AuditEntry::new(stage, reason.code(), Severity::Info, format!("{stage} skipped: {reason}"));
        Self::new(stage, StageStatus::Skipped(reason), vec![entry])
    }
}

// ============================================================================
// Analysis Result
// ============================================================================

/// Run identity and document audit data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub document: DocumentSummary,
    pub state_trail: Vec<PipelineState>,
}

/// The single hand-off artifact of a run. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub(crate) metadata: RunMetadata,
    pub(crate) state: PipelineState,
    pub(crate) parameters: ParameterSet,
    pub(crate) nodal: Option<NodalResult>,
    pub(crate) validation: ValidationReport,
    pub(crate) stages: Vec<StageOutcome>,
    pub(crate) audit_trail: Vec<AuditEntry>,
    pub(crate) questions: Vec<String>,
}

impl AnalysisResult {
    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn nodal(&self) -> Option<&NodalResult> {
        self.nodal.as_ref()
    }

    pub fn validation(&self) -> &ValidationReport {
        &self.validation
    }

    pub fn stage_outcomes(&self) -> &[StageOutcome] {
        &self.stages
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages.iter().find(|o| o.stage == stage)
    }

    pub fn audit_trail(&self) -> &[AuditEntry] {
        &self.audit_trail
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Number of audit entries with the given code.
    pub fn count_code(&self, code: IssueCode) -> usize {
        self.audit_trail.iter().filter(|e| e.code == code).count()
    }

    /// Process exit code for the calling harness.
    ///
    /// 0: every stage succeeded (fully or partially); 1: some stage failed or
    /// was skipped; 2: the run aborted before any stage ran.
    pub fn exit_code(&self) -> i32 {
        if self.state == PipelineState::Failed {
            2
        } else if self.stages.iter().all(|o| o.status.is_available()) {
            0
        } else {
            1
        }
    }
}
