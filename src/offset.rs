//! Selection-to-offset mapping.
//!
//! The text container is rendered as a flat list of runs: plain text nodes
//! for gaps and one highlight element per annotation, each holding exactly
//! its slice of the text as a single text node. A selection boundary is
//! located either inside a run or between runs, and its offset is the number
//! of chars rendered before it. Start and end are measured independently.

use std::cell::Cell;

use crate::model::{Document, Selection, Span};
use crate::render::Segment;

/// Position of one end of a selection range inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Inside the text of run `run`, after `offset` chars.
    Text {
        /// Index of the top-level run.
        run: usize,
        /// Chars into the run (clamped to its length).
        offset: usize,
    },
    /// Between top-level children: before child `index` (or at the end).
    Child {
        /// Number of runs preceding the boundary.
        index: usize,
    },
}

/// Char lengths of the rendered runs, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedRuns {
    lengths: Vec<usize>,
}

impl RenderedRuns {
    /// Build from the char length of each top-level child.
    pub fn new(lengths: Vec<usize>) -> Self {
        Self { lengths }
    }

    /// Runs produced by rendering `segments`.
    pub fn from_segments(segments: &[Segment]) -> Self {
        Self::new(segments.iter().map(Segment::char_len).collect())
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Check if nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Total rendered chars.
    pub fn total(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Chars rendered before `boundary`.
    pub fn offset_of(&self, boundary: Boundary) -> usize {
        match boundary {
            Boundary::Text { run, offset } => {
                let before: usize = self.lengths.iter().take(run).sum();
                let within = self.lengths.get(run).map_or(0, |len| offset.min(*len));
                before + within
            }
            Boundary::Child { index } => self.lengths.iter().take(index).sum(),
        }
    }

    /// Map a selection range to text offsets.
    ///
    /// Returns `None` when the range is collapsed or inverted.
    pub fn map(&self, start: Boundary, end: Boundary) -> Option<Span> {
        Span::new(self.offset_of(start), self.offset_of(end))
    }
}

/// Convert a UTF-16 offset into `text` (as reported by the DOM) to a char
/// offset. Offsets inside a surrogate pair round up to the following char.
pub fn utf16_to_char_offset(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (chars, c) in text.chars().enumerate() {
        if seen >= units {
            return chars;
        }
        seen += c.len_utf16();
    }
    text.chars().count()
}

/// Capability to read the live selection inside the text container.
///
/// Implemented over the browser selection on wasm; tests and non-browser
/// hosts use [`ManualSelection`].
pub trait SelectionSource {
    /// Offsets of the live selection, or `None` if there is no selection,
    /// it lies outside the container, or it is collapsed.
    fn current(&self) -> Option<Span>;

    /// Drop the live selection after it has been consumed.
    fn clear(&self) {}
}

/// A selection source driven by explicit calls instead of a UI surface.
#[derive(Debug, Default)]
pub struct ManualSelection {
    span: Cell<Option<Span>>,
}

impl ManualSelection {
    /// Create with no selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or unset) the live selection.
    pub fn select(&self, span: Option<Span>) {
        self.span.set(span);
    }
}

impl SelectionSource for ManualSelection {
    fn current(&self) -> Option<Span> {
        self.span.get()
    }

    fn clear(&self) {
        self.span.set(None);
    }
}

/// Live selection with a fallback to the last one captured on pointer release.
///
/// Clicking a label button clears the browser selection before the click
/// handler runs, so the selection is cached when the pointer is released over
/// the text container.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    last: Option<Span>,
}

impl SelectionTracker {
    /// Create with no cached selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache the current live selection, or forget the cache if there is none.
    pub fn capture<S: SelectionSource + ?Sized>(&mut self, source: &S) {
        self.last = source.current();
        log::trace!("Captured selection: {:?}", self.last);
    }

    /// The cached selection, if any.
    pub fn last(&self) -> Option<Span> {
        self.last
    }

    /// Resolve the selection to annotate: live first, cached second.
    ///
    /// Spans that fall outside `document` are treated as no selection.
    pub fn resolve<S: SelectionSource + ?Sized>(
        &self,
        source: &S,
        document: &Document,
    ) -> Option<Selection> {
        let in_bounds = |span: &Span| span.end <= document.char_len();
        let span = source
            .current()
            .filter(in_bounds)
            .or_else(|| self.last.filter(in_bounds))?;
        Some(Selection::new(span, document.slice(span)))
    }

    /// Forget the cached selection and clear the live one.
    pub fn clear<S: SelectionSource + ?Sized>(&mut self, source: &S) {
        self.last = None;
        source.clear();
    }

    /// Forget the cached selection only (e.g. when the document changes).
    pub fn forget(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Annotation;
    use crate::render::highlight_segments;

    const TEXT: &str = "Paris est une ville.";

    fn runs_with_paris_highlighted() -> RenderedRuns {
        let segments = highlight_segments(TEXT, &[Annotation::new(0, 5, "PERS")]);
        RenderedRuns::from_segments(&segments)
    }

    #[test]
    fn test_plain_text_offsets() {
        let runs = RenderedRuns::new(vec![20]);
        let span = runs.map(
            Boundary::Text { run: 0, offset: 6 },
            Boundary::Text { run: 0, offset: 9 },
        );
        assert_eq!(span, Span::new(6, 9));
    }

    #[test]
    fn test_offsets_after_highlight_span() {
        // Runs: "Paris" (highlight) + " est une ville." (plain)
        let runs = runs_with_paris_highlighted();
        assert_eq!(runs.len(), 2);
        let span = runs.map(
            Boundary::Text { run: 1, offset: 1 },
            Boundary::Text { run: 1, offset: 4 },
        );
        assert_eq!(span, Span::new(6, 9));
    }

    #[test]
    fn test_boundary_inside_highlight() {
        let runs = runs_with_paris_highlighted();
        let span = runs.map(
            Boundary::Text { run: 0, offset: 2 },
            Boundary::Text { run: 1, offset: 4 },
        );
        assert_eq!(span, Span::new(2, 9));
    }

    #[test]
    fn test_child_boundaries() {
        let runs = RenderedRuns::new(vec![5, 15]);
        assert_eq!(runs.offset_of(Boundary::Child { index: 0 }), 0);
        assert_eq!(runs.offset_of(Boundary::Child { index: 1 }), 5);
        assert_eq!(runs.offset_of(Boundary::Child { index: 2 }), 20);
        assert_eq!(
            runs.map(Boundary::Child { index: 0 }, Boundary::Child { index: 2 }),
            Span::new(0, 20)
        );
    }

    #[test]
    fn test_offset_clamps_to_run_length() {
        let runs = RenderedRuns::new(vec![5, 15]);
        assert_eq!(runs.offset_of(Boundary::Text { run: 0, offset: 99 }), 5);
        assert_eq!(runs.offset_of(Boundary::Text { run: 7, offset: 3 }), 20);
    }

    #[test]
    fn test_collapsed_or_inverted_is_no_selection() {
        let runs = RenderedRuns::new(vec![20]);
        let at = Boundary::Text { run: 0, offset: 4 };
        assert_eq!(runs.map(at, at), None);
        assert_eq!(
            runs.map(at, Boundary::Text { run: 0, offset: 2 }),
            None
        );
    }

    #[test]
    fn test_utf16_offsets_become_char_offsets() {
        assert_eq!(utf16_to_char_offset("Paris", 3), 3);
        assert_eq!(utf16_to_char_offset("Paris", 99), 5);
        // The emoji is one char but two UTF-16 units.
        let text = "a\u{1F600}b";
        assert_eq!(utf16_to_char_offset(text, 1), 1);
        assert_eq!(utf16_to_char_offset(text, 3), 2);
        assert_eq!(utf16_to_char_offset(text, 4), 3);
        assert_eq!(utf16_to_char_offset("été", 2), 2);
    }

    #[test]
    fn test_tracker_prefers_live_selection() {
        let doc = Document::new("d", TEXT);
        let source = ManualSelection::new();
        let mut tracker = SelectionTracker::new();

        source.select(Span::new(0, 5));
        tracker.capture(&source);
        source.select(Span::new(6, 9));

        let sel = tracker.resolve(&source, &doc).unwrap();
        assert_eq!(sel.span, Span::new(6, 9).unwrap());
        assert_eq!(sel.text, "est");
    }

    #[test]
    fn test_tracker_falls_back_to_captured_selection() {
        let doc = Document::new("d", TEXT);
        let source = ManualSelection::new();
        let mut tracker = SelectionTracker::new();

        source.select(Span::new(0, 5));
        tracker.capture(&source);
        // Clicking a button clears the live selection.
        source.select(None);

        let sel = tracker.resolve(&source, &doc).unwrap();
        assert_eq!(sel.text, "Paris");
    }

    #[test]
    fn test_tracker_without_any_selection() {
        let doc = Document::new("d", TEXT);
        let source = ManualSelection::new();
        let mut tracker = SelectionTracker::new();
        tracker.capture(&source);
        assert!(tracker.resolve(&source, &doc).is_none());
    }

    #[test]
    fn test_tracker_rejects_spans_past_document_end() {
        let doc = Document::new("d", "short");
        let source = ManualSelection::new();
        source.select(Span::new(2, 9));
        assert!(SelectionTracker::new().resolve(&source, &doc).is_none());
    }

    #[test]
    fn test_clear_drops_cache_and_live_selection() {
        let source = ManualSelection::new();
        let mut tracker = SelectionTracker::new();
        source.select(Span::new(0, 5));
        tracker.capture(&source);

        tracker.clear(&source);
        assert!(tracker.last().is_none());
        assert!(source.current().is_none());
    }
}
