//! Parameter extraction: registry-driven candidate search and selection

use std::ops::Range;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::number::parse_number;
use super::registry::{Locator, Normalizer, PatternRegistry, PatternRule};
use crate::config::ExtractionConfig;
use crate::types::{
    Alternate, ExtractedField, Extraction, ExtractionNote, FieldKind, FieldName, FieldValue,
    IssueCode, Provenance, RawTextDocument, ValueSource,
};
use crate::units::{canonical_unit, Unit};

/// A normalized match before selection.
#[derive(Debug, Clone)]
struct Candidate {
    raw: String,
    value: FieldValue,
    source_unit: Option<Unit>,
    offset: usize,
    confidence: f64,
}

/// Turns report text into typed, unit-normalized field candidates.
///
/// Pure function of the document, the registry and the extraction config.
pub struct ParameterExtractor<'a> {
    registry: &'a PatternRegistry,
    config: &'a ExtractionConfig,
}

impl<'a> ParameterExtractor<'a> {
    pub fn new(registry: &'a PatternRegistry, config: &'a ExtractionConfig) -> Self {
        Self { registry, config }
    }

    /// Extract every field the registry knows.
    ///
    /// Absent fields are simply not emitted. Malformed tokens are skipped and
    /// recorded as notes; extraction itself never fails.
    pub fn extract(&self, doc: &RawTextDocument) -> Extraction {
        let text = doc.normalized_text();
        let scale = if doc.used_ocr() { doc.confidence() } else { 1.0 };
        let mut extraction = Extraction::default();

        for spec in self.registry.fields() {
            let mut notes = Vec::new();
            let candidates = match &spec.locator {
                Locator::Label(label) => self.label_candidates(&text, spec.field, label, &mut notes),
                Locator::Anywhere(rules) => anywhere_candidates(&text, rules),
            };
            if let Some(field) = self.select(spec.field, candidates, &notes, scale) {
                extraction.fields.push(field);
            }
            extraction.notes.extend(notes);
        }

        debug!(
            fields = extraction.fields.len(),
            notes = extraction.notes.len(),
            "Extraction complete"
        );
        extraction
    }

    fn label_candidates(
        &self,
        text: &str,
        field: FieldName,
        label: &regex::Regex,
        notes: &mut Vec<ExtractionNote>,
    ) -> Vec<Candidate> {
        let rules = self.registry.rules(field.kind());
        let mut out = Vec::new();

        for label_match in label.find_iter(text) {
            let window = label_window(text, label_match.end(), self.config.label_window_chars);
            if window.is_empty() {
                continue;
            }
            let slice = &text[window.clone()];
            for rule in rules {
                for caps in rule.pattern.captures_iter(slice) {
                    let Some(whole) = caps.get(0) else { continue };
                    let offset = window.start + whole.start();
                    let end = window.start + whole.end();
                    let raw = whole.as_str().trim().to_string();

                    match rule.normalizer {
                        Normalizer::Quantity(unit) => {
                            if !standalone(text, offset, end, unit) {
                                continue;
                            }
                            let token = caps.name("num").map_or("", |m| m.as_str());
                            match parse_number(token) {
                                Ok(value) => out.push(Candidate {
                                    raw,
                                    value: FieldValue::Quantity {
                                        value: unit.to_canonical(value),
                                        unit: canonical_unit(unit.kind()).unwrap_or(unit),
                                    },
                                    source_unit: Some(unit),
                                    offset,
                                    confidence: rule.confidence,
                                }),
                                Err(e) => {
                                    debug!(field = %field, raw = %raw, error = %e, "Skipping malformed number");
                                    notes.push(ExtractionNote {
                                        field,
                                        offset,
                                        raw,
                                        code: IssueCode::MalformedNumber,
                                        reason: format!("malformed number: {e}"),
                                    });
                                }
                            }
                        }
                        Normalizer::Date => match parse_date(&raw) {
                            Some(date) => out.push(Candidate {
                                raw,
                                value: FieldValue::Date { date },
                                source_unit: None,
                                offset,
                                confidence: rule.confidence,
                            }),
                            None => notes.push(ExtractionNote {
                                field,
                                offset,
                                raw,
                                code: IssueCode::LowConfidence,
                                reason: "unrecognised date".to_string(),
                            }),
                        },
                        Normalizer::Text => {
                            let captured = caps.name("text").map_or(whole.as_str(), |m| m.as_str());
                            if let Some(text) = clean_text(captured) {
                                out.push(Candidate {
                                    raw,
                                    value: FieldValue::Text { text },
                                    source_unit: None,
                                    offset,
                                    confidence: rule.confidence,
                                });
                            }
                        }
                        Normalizer::Flag(value) => out.push(Candidate {
                            raw,
                            value: FieldValue::Flag { value },
                            source_unit: None,
                            offset,
                            confidence: rule.confidence,
                        }),
                    }
                }
            }
        }
        out
    }

    /// Pick the primary candidate; everything else becomes an alternate.
    fn select(
        &self,
        field: FieldName,
        mut candidates: Vec<Candidate>,
        notes: &[ExtractionNote],
        scale: f64,
    ) -> Option<ExtractedField> {
        // Stable sort: at equal offsets the earlier rule wins the dedup
        candidates.sort_by_key(|c| c.offset);
        candidates.dedup_by_key(|c| c.offset);
        if candidates.is_empty() {
            return None;
        }

        let kind = field.kind();
        let primary_idx = candidates
            .iter()
            .position(|c| plausible(kind, &c.value))
            .unwrap_or(0);
        let primary = candidates.remove(primary_idx);
        let primary_plausible = plausible(kind, &primary.value);

        let tolerance = self.config.conflict_tolerance_percent;
        let alternates: Vec<Alternate> = candidates
            .into_iter()
            .map(|c| Alternate {
                consistent: c.value.agrees_with(&primary.value, tolerance),
                plausible: plausible(kind, &c.value),
                raw: c.raw,
                value: c.value,
                source_unit: c.source_unit,
                offset: c.offset,
            })
            .collect();

        debug!(
            field = %field,
            value = %primary.value,
            plausible = primary_plausible,
            alternates = alternates.len(),
            "Selected primary candidate"
        );

        Some(ExtractedField {
            name: field,
            raw: primary.raw,
            source_unit: primary.source_unit,
            value: primary.value,
            confidence: (primary.confidence * scale).clamp(0.0, 1.0),
            offset: primary.offset,
            provenance: Provenance {
                source: ValueSource::Extracted,
                plausible: primary_plausible,
                alternates,
                notes: notes
                    .iter()
                    .map(|n| format!("'{}' at {}: {}", n.raw, n.offset, n.reason))
                    .collect(),
            },
        })
    }
}

/// Keyword rules: first match per rule over the whole document.
fn anywhere_candidates(text: &str, rules: &[PatternRule]) -> Vec<Candidate> {
    rules
        .iter()
        .filter_map(|rule| {
            let m = rule.pattern.find(text)?;
            let value = match rule.normalizer {
                Normalizer::Flag(value) => FieldValue::Flag { value },
                _ => FieldValue::Text {
                    text: m.as_str().to_string(),
                },
            };
            Some(Candidate {
                raw: m.as_str().to_string(),
                value,
                source_unit: None,
                offset: m.start(),
                confidence: rule.confidence,
            })
        })
        .collect()
}

// ============================================================================
// Helpers
// ============================================================================

/// Coarse physical range check on canonical values.
fn plausible(kind: FieldKind, value: &FieldValue) -> bool {
    match (value.as_f64(), kind.coarse_range()) {
        (Some(v), Some((lo, hi))) => v >= lo && v <= hi,
        _ => true,
    }
}

fn is_separator(c: char, next: Option<char>) -> bool {
    let next_is_space = next.map_or(true, char::is_whitespace);
    c.is_whitespace()
        || matches!(c, ':' | '=')
        || (matches!(c, '-' | '–' | '—') && next_is_space)
        || (c == '.' && (next_is_space || next == Some('.')))
}

/// Byte range searched for a label's value: separators and line breaks after
/// the label are skipped, then the window runs to the end of that line,
/// capped at `cap` characters.
fn label_window(text: &str, label_end: usize, cap: usize) -> Range<usize> {
    let rest = &text[label_end..];
    let mut chars = rest.char_indices().peekable();
    let mut skipped = rest.len();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|(_, n)| *n);
        if !is_separator(c, next) {
            skipped = i;
            break;
        }
    }

    let start = label_end + skipped;
    let line_end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    let end = text[start..line_end]
        .char_indices()
        .nth(cap)
        .map_or(line_end, |(i, _)| start + i);
    start..end
}

/// A unit match must not be glued to surrounding letters or digits, and a
/// plain unit followed by '/' is really part of a compound unit.
fn standalone(text: &str, start: usize, end: usize, unit: Unit) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    if before.is_some_and(char::is_alphanumeric) {
        return false;
    }
    if after.is_some_and(char::is_alphanumeric) {
        return false;
    }
    if unit.kind() != FieldKind::PressureGradient && after == Some('/') {
        return false;
    }
    true
}

const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%d %B %Y", "%d %b %Y", "%B %d %Y",
    "%b %d %Y", "%d.%m.%y", "%d/%m/%y",
];

/// Parse a report date; day-first for numeric forms.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned: Vec<String> = raw
        .split_whitespace()
        .map(|token| {
            let token = token.trim_end_matches([',', '.']);
            if token.starts_with(|c: char| c.is_ascii_digit()) {
                ["st", "nd", "rd", "th"]
                    .iter()
                    .find_map(|s| token.strip_suffix(s))
                    .unwrap_or(token)
                    .to_string()
            } else {
                token.to_string()
            }
        })
        .collect();
    let cleaned = cleaned.join(" ");

    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .find(|d| d.year() >= 1900)
}

/// Trim a free-text value: bullets, trailing punctuation, outer whitespace.
fn clean_text(raw: &str) -> Option<String> {
    let mut text = raw.trim().trim_start_matches(['•', '-', '*', '·']).trim_start();
    if let Some(rest) = text.strip_prefix("o ") {
        text = rest;
    }
    let text = text.trim_end_matches([',', ';', '.']).trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
