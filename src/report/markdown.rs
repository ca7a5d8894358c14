//! JSON and Markdown renderings of an `AnalysisResult`
//!
//! The Markdown output is a value skeleton only: tables of what was found and
//! computed, the issues raised, and what is still missing. Narrative text is
//! left to downstream tooling.

use crate::types::{AnalysisResult, FieldValue, Inflow, NodalResult, Stage, ValueSource};

impl AnalysisResult {
    /// Pretty-printed canonical JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Markdown skeleton with numbers rounded to `decimals` places.
    pub fn to_markdown(&self, decimals: usize) -> String {
        let meta = self.metadata();
        let doc = &meta.document;

        let mut out = String::new();
        out.push_str("# Completion Analysis\n\n");
        out.push_str(&format!("- Run: `{}`\n", meta.run_id));
        out.push_str(&format!("- Generated: {}\n", meta.generated_at.to_rfc3339()));
        if let Some(ref source) = doc.source {
            out.push_str(&format!("- Source: {source}\n"));
        }
        out.push_str(&format!("- Document MD5: `{}` ({} chars)\n", doc.digest, doc.characters));
        if doc.used_ocr {
            out.push_str(&format!("- OCR: yes (confidence {:.2})\n", doc.confidence));
        }
        out.push_str(&format!("- State: {}\n\n", self.state()));

        // Parameters
        out.push_str("## Extracted Parameters\n\n");
        if self.parameters().is_empty() {
            out.push_str("_No parameters extracted._\n\n");
        } else {
            out.push_str("| Field | Value | Confidence | Source | Raw | Flags |\n");
            out.push_str("|---|---|---|---|---|---|\n");
            for (name, entry) in self.parameters().iter() {
                let source = match entry.provenance.source {
                    ValueSource::Extracted => "extracted",
                    ValueSource::Override => "override",
                };
                let flags = if !entry.is_flagged() {
                    "-".to_string()
                } else {
                    entry
                        .flags
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                out.push_str(&format!(
                    "| {} | {} | {:.2} | {} | {} | {} |\n",
                    name.label(),
                    format_value(&entry.value, decimals),
                    entry.confidence,
                    source,
                    escape_cell(&entry.raw),
                    flags
                ));
            }
            out.push('\n');
        }

        // Nodal
        out.push_str("## Nodal Analysis\n\n");
        match self.nodal() {
            Some(result) => push_nodal_table(&mut out, result, decimals),
            None => {
                let reason = self
                    .stage(Stage::Calculation)
                    .and_then(|o| o.status.error())
                    .map_or_else(|| "not computed".to_string(), ToString::to_string);
                out.push_str(&format!("_Not computed: {reason}._\n\n"));
            }
        }

        // Issues
        out.push_str("## Validation Issues\n\n");
        let issues = self.validation().issues();
        if issues.is_empty() {
            out.push_str("_None._\n\n");
        } else {
            out.push_str("| Severity | Code | Subject | Message |\n");
            out.push_str("|---|---|---|---|\n");
            for issue in issues {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    issue.severity,
                    issue.code,
                    issue.subject,
                    escape_cell(&issue.message)
                ));
            }
            out.push('\n');
        }

        // Missing inputs
        out.push_str("## Missing Inputs for Nodal Analysis\n\n");
        if self.validation().readiness().absent.is_empty() {
            out.push_str("_None._\n\n");
        } else if self.questions().is_empty() {
            for field in &self.validation().readiness().absent {
                out.push_str(&format!("- {}\n", field.label()));
            }
            out.push('\n');
        } else {
            for question in self.questions() {
                out.push_str(&format!("- {question}\n"));
            }
            out.push('\n');
        }

        // Stages
        out.push_str("## Stage Outcomes\n\n");
        out.push_str("| Stage | Status | Detail |\n");
        out.push_str("|---|---|---|\n");
        for outcome in self.stage_outcomes() {
            let detail = outcome
                .status
                .error()
                .map_or_else(|| "-".to_string(), |e| escape_cell(&e.to_string()));
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                outcome.stage,
                outcome.status.label(),
                detail
            ));
        }

        out
    }
}

fn push_nodal_table(out: &mut String, result: &NodalResult, decimals: usize) {
    let d = decimals;
    out.push_str("| Quantity | Value |\n");
    out.push_str("|---|---|\n");
    out.push_str(&format!("| Velocity | {:.d$} m/s |\n", result.velocity_m_s));
    out.push_str(&format!("| Reynolds number | {:.0} |\n", result.reynolds_number));
    out.push_str(&format!("| Flow regime | {} |\n", result.flow_regime));
    out.push_str(&format!("| Friction factor | {:.4} |\n", result.friction_factor));
    out.push_str(&format!("| Friction drop | {:.d$} bar |\n", result.friction_drop_bar));
    out.push_str(&format!("| Hydrostatic drop | {:.d$} bar |\n", result.hydrostatic_drop_bar));
    out.push_str(&format!("| Total drop | {:.d$} bar |\n", result.total_drop_bar));
    out.push_str(&format!(
        "| Bottomhole pressure | {:.d$} bar |\n",
        result.bottomhole_pressure_bar
    ));
    match &result.inflow {
        Inflow::Computed(ipr) => {
            out.push_str(&format!(
                "| Reservoir pressure | {:.d$} bar |\n",
                ipr.reservoir_pressure_bar
            ));
            out.push_str(&format!(
                "| Productivity index | {:.d$} m³/h/bar |\n",
                ipr.productivity_index
            ));
            out.push_str(&format!(
                "| Max flow rate | {:.d$} m³/h |\n",
                ipr.max_flow_rate_m3_h
            ));
            out.push_str(&format!(
                "| Utilization | {:.d$} % |\n",
                ipr.utilization_percent
            ));
            out.push('\n');
        }
        Inflow::Unavailable { error } => {
            out.push_str(&format!("\n_Inflow unavailable: {error}._\n\n"));
        }
    }
}

fn format_value(value: &FieldValue, decimals: usize) -> String {
    match value {
        FieldValue::Quantity { value, unit } => format!("{value:.decimals$} {unit}"),
        other => escape_cell(&other.to_string()),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_rounds_quantities() {
        let value = FieldValue::Quantity {
            value: 2420.123,
            unit: crate::units::Unit::Metre,
        };
        assert_eq!(format_value(&value, 1), "2420.1 m");
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b\nc"), "a\\|b c");
    }
}
