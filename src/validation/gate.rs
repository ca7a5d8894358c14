//! Validation gate: plausibility bounds, conflicts, confidence, result sanity
//!
//! Flag-not-discard: every value survives into the ParameterSet; the gate only
//! records issues against it.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::readiness::assess;
use crate::config::{AnalysisConfig, Bounds};
use crate::types::{
    Alternate, Extraction, FieldName, FieldValue, FlowRegime, IssueCode, NodalInputs, NodalResult,
    ParameterEntry, ParameterSet, Provenance, Severity, ValidationIssue, ValidationReport,
    ValueSource,
};
use crate::units::canonical_unit;

/// Range-checks normalized fields and computed results.
pub struct ValidationGate<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> ValidationGate<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Build the frozen parameter set and the validation report.
    ///
    /// Overrides replace or fill nodal input fields; the displaced extracted
    /// value is kept as an alternate of the override entry.
    pub fn validate(
        &self,
        extraction: &Extraction,
        overrides: Option<&NodalInputs>,
    ) -> (ParameterSet, ValidationReport) {
        let mut entries: BTreeMap<FieldName, ParameterEntry> = BTreeMap::new();
        let mut issues = Vec::new();

        for field in &extraction.fields {
            let mut entry = ParameterEntry::from_extracted(field);
            self.check_entry(field.name, &mut entry, &mut issues);
            entries.insert(field.name, entry);
        }

        if let Some(overrides) = overrides {
            for field in overrides.populated() {
                let (Some(value), Some(unit)) = (overrides.get(field), canonical_unit(field.kind()))
                else {
                    continue;
                };
                let value = FieldValue::Quantity { value, unit };
                let previous = entries.remove(&field);
                let subject = format!("{field} (override)");

                let mut entry = self.override_entry(value.clone(), previous);
                entry.flags.push(IssueCode::OverrideApplied);
                issues.push(ValidationIssue {
                    subject: subject.clone(),
                    code: IssueCode::OverrideApplied,
                    severity: Severity::Info,
                    message: format!("{} set to {value} by caller", field.label()),
                    value: value.as_f64(),
                    bounds: None,
                });
                self.check_bounds(field, &subject, &mut entry, &mut issues);
                entries.insert(field, entry);
            }
        }

        let params = ParameterSet::from_entries(entries);
        let readiness = assess(&params);
        if !readiness.ready {
            warn!(absent = ?readiness.absent, "Nodal inputs incomplete");
        }
        debug!(
            parameters = params.len(),
            issues = issues.len(),
            ready = readiness.ready,
            "Validation complete"
        );

        (params, ValidationReport::new(issues, readiness))
    }

    /// Sanity checks on a computed nodal result. Same flag-not-discard policy.
    pub fn validate_result(&self, result: &NodalResult) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let quantities = [
            ("velocity_m_s", result.velocity_m_s),
            ("reynolds_number", result.reynolds_number),
            ("friction_factor", result.friction_factor),
            ("friction_drop_bar", result.friction_drop_bar),
            ("hydrostatic_drop_bar", result.hydrostatic_drop_bar),
            ("total_drop_bar", result.total_drop_bar),
            ("bottomhole_pressure_bar", result.bottomhole_pressure_bar),
        ];
        for (name, value) in quantities {
            if !value.is_finite() {
                issues.push(result_issue(
                    name,
                    IssueCode::ComputationError,
                    Severity::Error,
                    format!("{name} is not finite ({value})"),
                    Some(value),
                    None,
                ));
            }
        }

        if let Some(pi) = result.productivity_index() {
            if !pi.is_finite() || pi <= 0.0 {
                issues.push(result_issue(
                    "productivity_index",
                    IssueCode::ComputationError,
                    Severity::Error,
                    format!("productivity index must be finite and positive (got {pi})"),
                    Some(pi),
                    None,
                ));
            }
        }

        let pressure = self.config.bounds.pressure;
        let bhp = result.bottomhole_pressure_bar;
        if bhp.is_finite() && !pressure.contains(bhp) {
            issues.push(result_issue(
                "bottomhole_pressure_bar",
                IssueCode::OutOfRange,
                Severity::Warning,
                format!("bottomhole pressure {bhp:.2} bar outside plausible range {pressure} bar"),
                Some(bhp),
                Some(pressure),
            ));
        }

        let max_velocity = self.config.validation.max_velocity_m_s;
        if result.velocity_m_s > max_velocity {
            issues.push(result_issue(
                "velocity_m_s",
                IssueCode::OutOfRange,
                Severity::Warning,
                format!(
                    "tubing velocity {:.2} m/s exceeds {max_velocity:.1} m/s",
                    result.velocity_m_s
                ),
                Some(result.velocity_m_s),
                Some(Bounds::new(0.0, max_velocity)),
            ));
        }

        if let Some(utilization) = result.utilization_percent() {
            if utilization > 100.0 {
                issues.push(result_issue(
                    "utilization_percent",
                    IssueCode::OutOfRange,
                    Severity::Warning,
                    format!("rate is {utilization:.1}% of the inflow potential"),
                    Some(utilization),
                    Some(Bounds::new(0.0, 100.0)),
                ));
            }
        }

        if result.flow_regime == FlowRegime::Transitional {
            issues.push(result_issue(
                "friction_factor",
                IssueCode::LowConfidence,
                Severity::Warning,
                format!(
                    "Re = {:.0} is transitional; friction factor interpolated between laminar and Blasius",
                    result.reynolds_number
                ),
                Some(result.friction_factor),
                None,
            ));
        }

        for issue in &issues {
            warn!(subject = %issue.subject, code = %issue.code, "{}", issue.message);
        }
        issues
    }

    fn check_entry(&self, field: FieldName, entry: &mut ParameterEntry, issues: &mut Vec<ValidationIssue>) {
        let subject = field.as_str().to_string();
        self.check_bounds(field, &subject, entry, issues);

        if entry.provenance.is_conflicting() {
            let tolerance = self.config.extraction.conflict_tolerance_percent;
            let disagrees = entry.provenance.has_disagreement();
            let message = if !entry.provenance.plausible {
                format!(
                    "{} = {} fails the physical range check and no plausible candidate was found",
                    field.label(),
                    entry.value
                )
            } else {
                let others: Vec<String> = entry
                    .provenance
                    .alternates
                    .iter()
                    .filter(|a| !disagrees || !a.consistent)
                    .map(|a| format!("{} (\"{}\" at {})", a.value, a.raw, a.offset))
                    .collect();
                if disagrees {
                    format!("{} = {} disagrees with {}", field.label(), entry.value, others.join(", "))
                } else {
                    format!(
                        "{} = {} also reported as {} (within {tolerance}%)",
                        field.label(),
                        entry.value,
                        others.join(", ")
                    )
                }
            };
            let severity = if disagrees {
                warn!(field = %field, "{}", message);
                Severity::Warning
            } else {
                debug!(field = %field, "{}", message);
                Severity::Info
            };
            entry.flags.push(IssueCode::ConflictingValue);
            issues.push(ValidationIssue {
                subject: subject.clone(),
                code: IssueCode::ConflictingValue,
                severity,
                message,
                value: entry.value.as_f64(),
                bounds: None,
            });
        }

        let min_confidence = self.config.validation.min_confidence;
        if entry.confidence < min_confidence {
            entry.flags.push(IssueCode::LowConfidence);
            issues.push(ValidationIssue {
                subject,
                code: IssueCode::LowConfidence,
                severity: Severity::Info,
                message: format!(
                    "{} extracted with confidence {:.2} (below {min_confidence:.2})",
                    field.label(),
                    entry.confidence
                ),
                value: entry.value.as_f64(),
                bounds: None,
            });
        }
    }

    fn check_bounds(
        &self,
        field: FieldName,
        subject: &str,
        entry: &mut ParameterEntry,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let (Some(value), Some(bounds)) = (entry.value.as_f64(), self.config.bounds.for_kind(field.kind()))
        else {
            return;
        };
        if bounds.contains(value) {
            return;
        }
        let unit = canonical_unit(field.kind()).map_or("", |u| u.symbol());
        let message = format!(
            "{} = {value} {unit} outside plausible range {bounds} {unit}",
            field.label()
        );
        warn!(field = %field, value, "{}", message);
        entry.flags.push(IssueCode::OutOfRange);
        issues.push(ValidationIssue {
            subject: subject.to_string(),
            code: IssueCode::OutOfRange,
            severity: Severity::Warning,
            message,
            value: Some(value),
            bounds: Some((bounds.min, bounds.max)),
        });
    }

    fn override_entry(&self, value: FieldValue, previous: Option<ParameterEntry>) -> ParameterEntry {
        let tolerance = self.config.extraction.conflict_tolerance_percent;
        let mut alternates = Vec::new();
        if let Some(prev) = previous {
            alternates.push(Alternate {
                consistent: prev.value.agrees_with(&value, tolerance),
                plausible: prev.provenance.plausible,
                raw: prev.raw,
                value: prev.value,
                source_unit: prev.source_unit,
                offset: prev.offset,
            });
            alternates.extend(prev.provenance.alternates.into_iter().map(|a| Alternate {
                consistent: a.value.agrees_with(&value, tolerance),
                ..a
            }));
        }

        ParameterEntry {
            raw: value.to_string(),
            value,
            confidence: 1.0,
            offset: 0,
            source_unit: None,
            provenance: Provenance {
                source: ValueSource::Override,
                plausible: true,
                alternates,
                notes: Vec::new(),
            },
            flags: Vec::new(),
        }
    }
}

fn result_issue(
    subject: &str,
    code: IssueCode,
    severity: Severity,
    message: String,
    value: Option<f64>,
    bounds: Option<Bounds>,
) -> ValidationIssue {
    ValidationIssue {
        subject: subject.to_string(),
        code,
        severity,
        message,
        value,
        bounds: bounds.map(|b| (b.min, b.max)),
    }
}
