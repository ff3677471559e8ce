//! Client-side mirror of the current document's annotations.
//!
//! Annotations are kept sorted by `start` at all times, so the storage index
//! is also the display index used by the list view and by [`AnnotationStore::remove`].
//! The set is pairwise non-overlapping.

use crate::error::AnnotationError;
use crate::model::{Annotation, Span};

/// Ordered, non-overlapping annotation set for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationStore {
    /// Sorted by `start`.
    annotations: Vec<Annotation>,
    /// Length of the document text in chars; bounds every `end`.
    text_len: usize,
    /// Set on local mutation, cleared once the backend has been told.
    dirty: bool,
}

impl AnnotationStore {
    /// Create an empty store for a text of `text_len` chars.
    pub fn new(text_len: usize) -> Self {
        Self {
            annotations: Vec::new(),
            text_len,
            dirty: false,
        }
    }

    /// Length of the text this store validates against.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Check if the store changed since the last [`clear_dirty`](Self::clear_dirty).
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call once the set has been handed to the sync queue.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// First annotation intersecting `span`, if any.
    pub fn overlapping(&self, span: Span) -> Option<&Annotation> {
        self.annotations.iter().find(|a| {
            a.span().is_some_and(|existing| existing.overlaps(&span))
        })
    }

    /// Check a candidate against the bounds and non-overlap invariants.
    pub fn validate(&self, candidate: &Annotation) -> Result<Span, AnnotationError> {
        let span = candidate.span().ok_or(AnnotationError::EmptySpan {
            start: candidate.start,
            end: candidate.end,
        })?;
        if span.end > self.text_len {
            return Err(AnnotationError::OutOfBounds {
                start: span.start,
                end: span.end,
                len: self.text_len,
            });
        }
        if let Some(existing) = self.overlapping(span) {
            return Err(AnnotationError::overlap(
                span,
                Span {
                    start: existing.start,
                    end: existing.end,
                },
            ));
        }
        Ok(span)
    }

    /// Insert a candidate at its sorted position.
    ///
    /// Returns the display index of the new annotation. On error the store is
    /// unchanged.
    pub fn add(&mut self, candidate: Annotation) -> Result<usize, AnnotationError> {
        let span = self.validate(&candidate)?;
        let index = self
            .annotations
            .partition_point(|a| a.start < span.start);
        self.annotations.insert(index, candidate);
        self.dirty = true;
        log::debug!(
            "Added annotation {}-{} at position {} ({} total)",
            span.start,
            span.end,
            index,
            self.annotations.len()
        );
        Ok(index)
    }

    /// Remove the annotation at display position `index`.
    pub fn remove(&mut self, index: usize) -> Result<Annotation, AnnotationError> {
        if index >= self.annotations.len() {
            return Err(AnnotationError::IndexOutOfRange {
                index,
                len: self.annotations.len(),
            });
        }
        let removed = self.annotations.remove(index);
        self.dirty = true;
        log::debug!(
            "Removed annotation {}-{} from position {}",
            removed.start,
            removed.end,
            index
        );
        Ok(removed)
    }

    /// Replace everything with a set received from the backend.
    ///
    /// The backend is authoritative, but entries that would break the local
    /// invariants (empty, out of bounds, overlapping an earlier entry) are
    /// dropped so rendering stays well-defined. Returns how many were dropped.
    pub fn replace_all(&mut self, text_len: usize, incoming: Vec<Annotation>) -> usize {
        let mut incoming = incoming;
        incoming.sort_by_key(|a| (a.start, a.end));

        let total = incoming.len();
        let mut kept: Vec<Annotation> = Vec::with_capacity(total);
        for ann in incoming {
            let valid = ann.end > ann.start
                && ann.end <= text_len
                && kept.last().is_none_or(|prev| prev.end <= ann.start);
            if valid {
                kept.push(ann);
            } else {
                log::warn!(
                    "Dropping annotation {}-{} [{}] from backend: invalid or overlapping",
                    ann.start,
                    ann.end,
                    ann.label
                );
            }
        }

        let dropped = total - kept.len();
        self.annotations = kept;
        self.text_len = text_len;
        self.dirty = false;
        dropped
    }

    /// Remove all annotations and reset to an empty text.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.text_len = 0;
        self.dirty = false;
    }

    /// Annotation at display position `index`.
    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.annotations.get(index)
    }

    /// Annotations in display (start) order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Annotations in display (start) order.
    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Owned snapshot of the full set, for pushing to the backend.
    pub fn to_vec(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    /// Number of annotations.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Check if there are no annotations.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(store: &AnnotationStore) -> Vec<(usize, usize)> {
        store.iter().map(|a| (a.start, a.end)).collect()
    }

    #[test]
    fn test_add_non_overlapping_grows_by_one() {
        let mut store = AnnotationStore::new(20);
        assert_eq!(store.add(Annotation::new(0, 5, "PERS")), Ok(0));
        assert_eq!(store.len(), 1);
        assert!(store.is_dirty());

        store.add(Annotation::new(14, 19, "LOC")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_overlapping_is_rejected_and_store_unchanged() {
        let mut store = AnnotationStore::new(20);
        store.add(Annotation::new(0, 5, "PERS")).unwrap();
        store.clear_dirty();
        let before = store.clone();

        let err = store.add(Annotation::new(3, 8, "LOC")).unwrap_err();
        assert!(matches!(err, AnnotationError::Overlap { .. }));
        assert_eq!(store, before);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_touching_spans_are_accepted() {
        let mut store = AnnotationStore::new(20);
        store.add(Annotation::new(0, 5, "PERS")).unwrap();
        store.add(Annotation::new(5, 9, "LOC")).unwrap();
        assert_eq!(spans(&store), vec![(0, 5), (5, 9)]);
    }

    #[test]
    fn test_add_rejects_empty_and_out_of_bounds() {
        let mut store = AnnotationStore::new(10);
        assert_eq!(
            store.add(Annotation::new(4, 4, "PERS")),
            Err(AnnotationError::EmptySpan { start: 4, end: 4 })
        );
        assert_eq!(
            store.add(Annotation::new(6, 11, "PERS")),
            Err(AnnotationError::OutOfBounds {
                start: 6,
                end: 11,
                len: 10
            })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_display_order_is_sorted_regardless_of_insertion() {
        let mut store = AnnotationStore::new(100);
        for (start, end) in [(40, 45), (0, 3), (90, 99), (10, 20), (50, 60)] {
            store.add(Annotation::new(start, end, "MISC")).unwrap();
        }
        let starts: Vec<usize> = store.iter().map(|a| a.start).collect();
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(starts, vec![0, 10, 40, 50, 90]);
    }

    #[test]
    fn test_add_returns_display_index() {
        let mut store = AnnotationStore::new(100);
        store.add(Annotation::new(10, 20, "LOC")).unwrap();
        assert_eq!(store.add(Annotation::new(0, 5, "PERS")), Ok(0));
        assert_eq!(store.add(Annotation::new(30, 35, "ORG")), Ok(2));
    }

    #[test]
    fn test_remove_reindexes() {
        let mut store = AnnotationStore::new(20);
        store.add(Annotation::new(10, 15, "LOC")).unwrap();
        store.add(Annotation::new(0, 5, "PERS")).unwrap();

        let removed = store.remove(0).unwrap();
        assert_eq!((removed.start, removed.end), (0, 5));
        assert_eq!(spans(&store), vec![(10, 15)]);
        assert_eq!(store.get(0).map(|a| a.start), Some(10));
    }

    #[test]
    fn test_remove_out_of_range_is_an_error() {
        let mut store = AnnotationStore::new(20);
        store.add(Annotation::new(0, 5, "PERS")).unwrap();
        store.clear_dirty();

        assert_eq!(
            store.remove(1),
            Err(AnnotationError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(store.len(), 1);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_replace_all_sorts_and_drops_invalid() {
        let mut store = AnnotationStore::new(5);
        store.add(Annotation::new(0, 2, "PERS")).unwrap();

        let dropped = store.replace_all(
            30,
            vec![
                Annotation::new(20, 25, "LOC"),
                Annotation::new(0, 5, "PERS"),
                Annotation::new(3, 8, "ORG"),
                Annotation::new(9, 9, "DATE"),
                Annotation::new(28, 31, "MISC"),
            ],
        );

        assert_eq!(dropped, 3);
        assert_eq!(spans(&store), vec![(0, 5), (20, 25)]);
        assert_eq!(store.text_len(), 30);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_clear() {
        let mut store = AnnotationStore::new(20);
        store.add(Annotation::new(0, 5, "PERS")).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.text_len(), 0);
    }
}
