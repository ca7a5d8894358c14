//! Normalized, frozen parameter set

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ExtractedField, FieldName, FieldValue, IssueCode, Provenance};
use crate::units::Unit;

/// One normalized parameter with its provenance and validation flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub value: FieldValue,
    pub confidence: f64,
    pub raw: String,
    pub offset: usize,
    pub source_unit: Option<Unit>,
    pub provenance: Provenance,
    /// Codes raised against this value by the validation gate
    pub flags: Vec<IssueCode>,
}

impl ParameterEntry {
    pub(crate) fn from_extracted(field: &ExtractedField) -> Self {
        Self {
            value: field.value.clone(),
            confidence: field.confidence,
            raw: field.raw.clone(),
            offset: field.offset,
            source_unit: field.source_unit,
            provenance: field.provenance.clone(),
            flags: Vec::new(),
        }
    }

    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }
}

/// Field name → normalized value. Keys are unique; quantities are canonical.
///
/// Built by the validation gate and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    entries: BTreeMap<FieldName, ParameterEntry>,
}

impl ParameterSet {
    pub(crate) fn from_entries(entries: BTreeMap<FieldName, ParameterEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: FieldName) -> Option<&ParameterEntry> {
        self.entries.get(&name)
    }

    /// Canonical numeric value of a quantity field.
    pub fn quantity(&self, name: FieldName) -> Option<f64> {
        self.entries.get(&name).and_then(|e| e.value.as_f64())
    }

    pub fn contains(&self, name: FieldName) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &ParameterEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
