//! Audit trail vocabulary: stages, issue codes, severities

use serde::{Deserialize, Serialize};

/// Pipeline stage that produced an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Validation,
    Calculation,
    Reporting,
}

impl Stage {
    /// Execution order.
    pub const ORDER: [Stage; 4] = [
        Stage::Extraction,
        Stage::Validation,
        Stage::Calculation,
        Stage::Reporting,
    ];
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Extraction => write!(f, "Extraction"),
            Stage::Validation => write!(f, "Validation"),
            Stage::Calculation => write!(f, "Calculation"),
            Stage::Reporting => write!(f, "Reporting"),
        }
    }
}

/// Machine-readable reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Required nodal input absent
    MissingField,
    /// Value present but outside plausibility bounds
    OutOfRange,
    /// Candidates disagree, or the primary failed the coarse range check
    ConflictingValue,
    /// Value or approximation of reduced reliability
    LowConfidence,
    /// Numeric token could not be parsed and was skipped
    MalformedNumber,
    /// Input present but physically invalid
    InvalidInput,
    /// A calculation could not produce a finite answer
    ComputationError,
    /// Inflow block (PI, max rate, utilization) not computed
    InflowUnavailable,
    /// Text was readable but no field matched
    NoFieldsExtracted,
    /// No usable text at all
    ExtractionEmpty,
    /// Caller signalled abort
    Cancelled,
    /// Caller-supplied value replaced or filled an extracted one
    OverrideApplied,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::MissingField => "MISSING_FIELD",
            IssueCode::OutOfRange => "OUT_OF_RANGE",
            IssueCode::ConflictingValue => "CONFLICTING_VALUE",
            IssueCode::LowConfidence => "LOW_CONFIDENCE",
            IssueCode::MalformedNumber => "MALFORMED_NUMBER",
            IssueCode::InvalidInput => "INVALID_INPUT",
            IssueCode::ComputationError => "COMPUTATION_ERROR",
            IssueCode::InflowUnavailable => "INFLOW_UNAVAILABLE",
            IssueCode::NoFieldsExtracted => "NO_FIELDS_EXTRACTED",
            IssueCode::ExtractionEmpty => "EXTRACTION_EMPTY",
            IssueCode::Cancelled => "CANCELLED",
            IssueCode::OverrideApplied => "OVERRIDE_APPLIED",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One line of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub stage: Stage,
    pub code: IssueCode,
    pub severity: Severity,
    /// Field or result quantity the entry is about
    pub subject: Option<String>,
    pub message: String,
}

impl AuditEntry {
    pub fn new(stage: Stage, code: IssueCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            stage,
            code,
            severity,
            subject: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl std::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} {}", self.severity, self.stage, self.code)?;
        if let Some(ref s) = self.subject {
            write!(f, " ({s})")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_code_serializes_screaming_snake() {
        for code in [
            IssueCode::MissingField,
            IssueCode::OutOfRange,
            IssueCode::ComputationError,
            IssueCode::ExtractionEmpty,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_audit_entry_display() {
        let entry = AuditEntry::new(
            Stage::Calculation,
            IssueCode::MissingField,
            Severity::Error,
            "tubing diameter not found",
        )
        .about("tubing_diameter");
        assert_eq!(
            entry.to_string(),
            "[ERROR] Calculation MISSING_FIELD (tubing_diameter): tubing diameter not found"
        );
    }
}
