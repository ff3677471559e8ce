//! The editing session: current document, its annotations, the active label.
//!
//! Exactly one document is loaded at a time. Loading replaces the document
//! and its annotations together; clearing empties both. The active label
//! survives either.

use crate::error::AnnotationError;
use crate::model::{Annotation, DocId, Document, Label, Selection};
use crate::store::AnnotationStore;

/// Client-side state for one annotator.
#[derive(Debug, Clone, Default)]
pub struct Session {
    document: Option<Document>,
    store: AnnotationStore,
    active_label: Label,
}

impl Session {
    /// Create an empty session with `active_label` selected.
    pub fn new(active_label: Label) -> Self {
        Self {
            document: None,
            store: AnnotationStore::default(),
            active_label,
        }
    }

    /// The loaded document, if any.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Id of the loaded document, if any.
    pub fn doc_id(&self) -> Option<&DocId> {
        self.document.as_ref().map(Document::id)
    }

    /// Text of the loaded document, or `""`.
    pub fn text(&self) -> &str {
        self.document.as_ref().map_or("", Document::text)
    }

    /// Check if `doc_id` is the loaded document.
    pub fn is_current(&self, doc_id: &DocId) -> bool {
        self.doc_id() == Some(doc_id)
    }

    /// The annotation store.
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Mutable access to the annotation store.
    pub fn store_mut(&mut self) -> &mut AnnotationStore {
        &mut self.store
    }

    /// Annotations in display order.
    pub fn annotations(&self) -> &[Annotation] {
        self.store.as_slice()
    }

    /// Label applied to new annotations.
    pub fn active_label(&self) -> &Label {
        &self.active_label
    }

    /// Change the label applied to new annotations.
    pub fn set_active_label(&mut self, label: Label) {
        log::debug!("Active label: {label}");
        self.active_label = label;
    }

    /// Replace the document and its annotations.
    ///
    /// Returns how many incoming annotations were dropped as invalid.
    pub fn load(&mut self, document: Document, annotations: Vec<Annotation>) -> usize {
        let dropped = self.store.replace_all(document.char_len(), annotations);
        log::info!(
            "Loaded document {} ({} chars, {} annotations)",
            document.id(),
            document.char_len(),
            self.store.len()
        );
        self.document = Some(document);
        dropped
    }

    /// Unload the document: no id, empty text, no annotations.
    pub fn clear(&mut self) {
        if let Some(doc) = self.document.take() {
            log::info!("Cleared document {}", doc.id());
        }
        self.store.clear();
    }

    /// Annotate `selection` with the active label.
    pub fn annotate(&mut self, selection: &Selection) -> Result<usize, AnnotationError> {
        if self.document.is_none() {
            return Err(AnnotationError::NoDocument);
        }
        let candidate = Annotation::from_span(selection.span, self.active_label.clone());
        self.store.add(candidate)
    }

    /// Remove the annotation at display position `index`.
    pub fn remove(&mut self, index: usize) -> Result<Annotation, AnnotationError> {
        self.store.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Span;

    fn paris_session() -> Session {
        let mut session = Session::new(Label::default());
        session.load(Document::new("d1", "Paris est une ville."), Vec::new());
        session
    }

    #[test]
    fn test_annotate_with_active_label() {
        let mut session = paris_session();
        let selection = Selection::new(Span::new(0, 5).unwrap(), "Paris");
        assert_eq!(session.annotate(&selection), Ok(0));
        assert_eq!(session.annotations(), &[Annotation::new(0, 5, "PERS")]);
    }

    #[test]
    fn test_annotate_without_document() {
        let mut session = Session::new(Label::default());
        let selection = Selection::new(Span::new(0, 5).unwrap(), "Paris");
        assert_eq!(session.annotate(&selection), Err(AnnotationError::NoDocument));
    }

    #[test]
    fn test_load_replaces_document_and_annotations() {
        let mut session = paris_session();
        session
            .annotate(&Selection::new(Span::new(0, 5).unwrap(), "Paris"))
            .unwrap();

        session.load(
            Document::new("d2", "Lyon"),
            vec![Annotation::new(0, 4, "LOC")],
        );
        assert_eq!(session.doc_id(), Some(&DocId::new("d2")));
        assert_eq!(session.annotations(), &[Annotation::new(0, 4, "LOC")]);
        assert!(!session.store().is_dirty());
    }

    #[test]
    fn test_clear_keeps_active_label() {
        let mut session = paris_session();
        session.set_active_label(Label::new("LOC"));
        session.clear();

        assert!(session.doc_id().is_none());
        assert_eq!(session.text(), "");
        assert!(session.annotations().is_empty());
        assert_eq!(session.active_label(), &Label::new("LOC"));
    }
}
