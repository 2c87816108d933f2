//! Inferred document metadata.

use serde::{Deserialize, Serialize};

/// Document metadata inferred by the metadata extractor.
///
/// Written once at the start of a conversion and read-only afterwards.
/// Each field is an independent best-effort extraction with its own
/// confidence score; absence of one never blocks the others.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Inferred title. Always present: the extractor falls back to the
    /// caller-supplied default identifier when no candidate is plausible.
    pub title: Inferred<String>,

    /// Inferred author list.
    pub authors: Inferred<Vec<String>>,

    /// Inferred date, normalized to a canonical format.
    pub date: Inferred<String>,

    /// Abstract body text, when an "Abstract" marker block was found.
    pub abstract_text: Inferred<String>,
}

impl DocumentMetadata {
    /// Check whether any field was inferred with confidence above zero.
    pub fn is_empty(&self) -> bool {
        self.title.value.is_none()
            && self.authors.value.is_none()
            && self.date.value.is_none()
            && self.abstract_text.value.is_none()
    }
}

/// A value paired with the confidence of the heuristic that produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inferred<T> {
    /// The inferred value, if any.
    pub value: Option<T>,

    /// Confidence in [0, 1].
    pub confidence: f32,
}

impl<T> Inferred<T> {
    /// Create an inferred value with the given confidence (clamped to [0,1]).
    pub fn new(value: T, confidence: f32) -> Self {
        Self {
            value: Some(value),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// An absent value with zero confidence.
    pub fn none() -> Self {
        Self {
            value: None,
            confidence: 0.0,
        }
    }

    /// Borrow the value if present.
    pub fn as_ref(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        let inferred = Inferred::new("Title".to_string(), 1.7);
        assert_eq!(inferred.confidence, 1.0);
        let inferred = Inferred::new("Title".to_string(), -0.3);
        assert_eq!(inferred.confidence, 0.0);
    }

    #[test]
    fn test_metadata_empty() {
        let meta = DocumentMetadata::default();
        assert!(meta.is_empty());
    }
}
