//! Data models for the annotation client.

mod annotation;
mod document;
mod label;
mod span;

pub use annotation::Annotation;
pub use document::{DocId, Document, byte_index, char_slice};
pub use label::{DEFAULT_LABEL, Label, default_labels};
pub use span::{Selection, Span};
