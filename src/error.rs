//! Validation errors raised by local annotation operations.
//!
//! These never reach the backend: the controller turns them into a
//! user-facing alert and leaves all state untouched.

use thiserror::Error;

use crate::model::Span;

/// Errors from selecting, adding or removing annotations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// No document is loaded
    #[error("No document is loaded")]
    NoDocument,

    /// Neither a live nor a cached selection is available
    #[error("Select some text in the document first")]
    NoSelection,

    /// Candidate interval is empty or inverted
    #[error("Empty span {start}-{end}")]
    EmptySpan {
        /// Requested start offset
        start: usize,
        /// Requested end offset
        end: usize,
    },

    /// Candidate extends past the end of the text
    #[error("Span {start}-{end} exceeds document length {len}")]
    OutOfBounds {
        /// Requested start offset
        start: usize,
        /// Requested end offset
        end: usize,
        /// Document length in chars
        len: usize,
    },

    /// Candidate intersects an existing annotation
    #[error(
        "Selection {}-{} overlaps existing annotation {}-{}",
        candidate.start,
        candidate.end,
        existing.start,
        existing.end
    )]
    Overlap {
        /// The rejected interval
        candidate: Span,
        /// The annotation it collides with
        existing: Span,
    },

    /// Display index does not refer to an annotation
    #[error("No annotation at position {index} (have {len})")]
    IndexOutOfRange {
        /// Requested display position
        index: usize,
        /// Current number of annotations
        len: usize,
    },
}

impl AnnotationError {
    /// Create an overlap error.
    pub fn overlap(candidate: Span, existing: Span) -> Self {
        Self::Overlap {
            candidate,
            existing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_message_names_both_spans() {
        let err = AnnotationError::overlap(Span::new(3, 8).unwrap(), Span::new(0, 5).unwrap());
        assert_eq!(
            err.to_string(),
            "Selection 3-8 overlaps existing annotation 0-5"
        );
    }
}
