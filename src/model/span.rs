//! Character intervals and transient text selections.

use serde::{Deserialize, Serialize};

/// Half-open char interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// First char covered.
    pub start: usize,
    /// One past the last char covered.
    pub end: usize,
}

impl Span {
    /// Create a span. Returns `None` for empty or inverted intervals.
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Number of chars covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; empty spans cannot be constructed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Two spans overlap unless one ends at or before the other starts.
    pub fn overlaps(&self, other: &Span) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}

/// A resolved selection: where it is and what it covers.
///
/// Lives only between pointer release (or button click) and the moment it
/// becomes an annotation or is abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Offsets into the canonical text.
    pub span: Span,
    /// The covered substring, for display.
    pub text: String,
}

impl Selection {
    /// Create a selection from its span and covered text.
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}
