//! Document data model.
//!
//! A document is created by the backend (upload or directory scan) and is
//! read-only on the client. All offsets into its text count `char`s, not
//! bytes, so slicing goes through [`Document::slice`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Span;

/// Opaque, server-assigned document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Wrap a server-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A loaded document: identifier plus its canonical (backend-normalized) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocId,
    text: String,
    /// Cached `text.chars().count()`.
    char_len: usize,
}

impl Document {
    /// Create a document from the backend's id and normalized text.
    pub fn new(id: impl Into<DocId>, text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            id: id.into(),
            text,
            char_len,
        }
    }

    /// The document id.
    pub fn id(&self) -> &DocId {
        &self.id
    }

    /// The full canonical text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in chars (the unit all offsets use).
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Text covered by `span`, clamped to the end of the document.
    pub fn slice(&self, span: Span) -> &str {
        char_slice(&self.text, span.start, span.end)
    }
}

/// Byte index of the `char_idx`-th char, or `text.len()` past the end.
pub fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(i, _)| i)
}

/// Slice `text` by char offsets. Out-of-range offsets clamp to the end.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    if end <= start {
        return "";
    }
    let from = byte_index(text, start);
    let to = from + byte_index(&text[from..], end - start);
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        let doc = Document::new("d1", "Émile à Zürich");
        assert_eq!(doc.char_len(), 14);
        assert!(doc.text().len() > doc.char_len());
    }

    #[test]
    fn test_slice_multibyte() {
        let doc = Document::new("d1", "Émile à Zürich");
        assert_eq!(doc.slice(Span::new(0, 5).unwrap()), "Émile");
        assert_eq!(doc.slice(Span::new(8, 14).unwrap()), "Zürich");
    }

    #[test]
    fn test_slice_clamps_past_end() {
        assert_eq!(char_slice("abc", 1, 10), "bc");
        assert_eq!(char_slice("abc", 5, 10), "");
        assert_eq!(char_slice("abc", 2, 2), "");
    }

    #[test]
    fn test_doc_id_serializes_as_plain_string() {
        let id = DocId::new("1f2e");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1f2e\"");
        assert_eq!(id.to_string(), "1f2e");
    }
}
