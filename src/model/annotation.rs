//! Span annotation record.

use serde::{Deserialize, Serialize};

use super::{Label, Span};

/// A labeled char interval over the current document.
///
/// This is also the wire shape used by the backend. The backend echoes an
/// extra `text` field with the covered substring; it is ignored on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    /// First char covered.
    pub start: usize,
    /// One past the last char covered.
    pub end: usize,
    /// Entity type.
    pub label: Label,
}

impl Annotation {
    /// Create an annotation from raw offsets.
    pub fn new(start: usize, end: usize, label: impl Into<Label>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Create an annotation covering `span`.
    pub fn from_span(span: Span, label: Label) -> Self {
        Self {
            start: span.start,
            end: span.end,
            label,
        }
    }

    /// The covered interval, or `None` if `end <= start`.
    pub fn span(&self) -> Option<Span> {
        Span::new(self.start, self.end)
    }

    /// Interval overlap test against another annotation.
    pub fn overlaps(&self, other: &Annotation) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ignores_echoed_text() {
        let json = r#"{"start":0,"end":5,"label":"PERS","text":"Paris"}"#;
        let ann: Annotation = serde_json::from_str(json).unwrap();
        assert_eq!(ann, Annotation::new(0, 5, "PERS"));
    }

    #[test]
    fn test_serialize_wire_shape() {
        let json = serde_json::to_value(Annotation::new(3, 8, "LOC")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "start": 3, "end": 8, "label": "LOC" })
        );
    }

    #[test]
    fn test_overlaps_is_symmetric() {
        let a = Annotation::new(0, 5, "PERS");
        let b = Annotation::new(3, 8, "LOC");
        let c = Annotation::new(5, 8, "LOC");
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c) && !c.overlaps(&a));
    }
}
