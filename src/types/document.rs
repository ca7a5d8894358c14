//! Raw report text and its acquisition metadata

use serde::{Deserialize, Serialize};

/// Immutable input text for one analysis run.
///
/// Produced by a `TextSource` (or directly by callers that already hold the
/// text). `used_ocr` and `confidence` come from the external text extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTextDocument {
    text: String,
    used_ocr: bool,
    confidence: f64,
    source: Option<String>,
}

impl RawTextDocument {
    /// Plain digital text: no OCR, full confidence.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            used_ocr: false,
            confidence: 1.0,
            source: None,
        }
    }

    /// Text recovered by OCR with the extractor's confidence (clamped to [0, 1]).
    pub fn from_ocr(text: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            text: text.into(),
            used_ocr: true,
            confidence,
            source: None,
        }
    }

    /// Attach a source label (usually the file path).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn used_ocr(&self) -> bool {
        self.used_ocr
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// No usable text at all.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whitespace-normalized view the extractor runs on.
    ///
    /// Runs of spaces/tabs collapse to one space, three or more line breaks
    /// collapse to a blank line, and outer whitespace is trimmed.
    pub fn normalized_text(&self) -> String {
        normalize_whitespace(&self.text)
    }

    /// MD5 digest of the raw text, hex encoded.
    pub fn digest(&self) -> String {
        format!("{:x}", md5::compute(self.text.as_bytes()))
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            source: self.source.clone(),
            digest: self.digest(),
            characters: self.text.chars().count(),
            used_ocr: self.used_ocr,
            confidence: self.confidence,
        }
    }
}

/// Audit view of the input document carried in every `AnalysisResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub source: Option<String>,
    pub digest: String,
    pub characters: usize,
    pub used_ocr: bool,
    pub confidence: f64,
}

fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut newlines = 0usize;

    for ch in text.chars() {
        match ch {
            ' ' | '\t' | '\u{a0}' => pending_space = true,
            '\n' => {
                newlines += 1;
                pending_space = false;
            }
            _ => {
                if newlines > 0 {
                    let breaks = if newlines >= 3 { 2 } else { newlines };
                    if !out.is_empty() {
                        for _ in 0..breaks {
                            out.push('\n');
                        }
                    }
                    newlines = 0;
                } else if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(ch);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_spaces_and_blank_lines() {
        let doc = RawTextDocument::new("  Well Name \t\t F-9A  \n\n\n\nOperation   Workover\r\n");
        assert_eq!(doc.normalized_text(), "Well Name F-9A\n\nOperation Workover");
    }

    #[test]
    fn test_single_and_double_breaks_survive() {
        let doc = RawTextDocument::new("a\nb\n\nc");
        assert_eq!(doc.normalized_text(), "a\nb\n\nc");
    }

    #[test]
    fn test_blank_document() {
        assert!(RawTextDocument::new(" \n\t ").is_blank());
        assert!(!RawTextDocument::new("x").is_blank());
    }

    #[test]
    fn test_ocr_confidence_clamped() {
        assert_eq!(RawTextDocument::from_ocr("x", 1.7).confidence(), 1.0);
        assert_eq!(RawTextDocument::from_ocr("x", f64::NAN).confidence(), 0.0);
        assert!(RawTextDocument::from_ocr("x", 0.8).used_ocr());
    }

    #[test]
    fn test_digest_is_stable() {
        let a = RawTextDocument::new("report");
        let b = RawTextDocument::new("report").with_source("other.txt");
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 32);
    }
}
