//! Annotel - browser client for span annotation of text documents
//!
//! The user selects a span of a displayed document, assigns it an entity
//! label, and the client keeps a non-overlapping annotation set in sync with
//! a backend that stores documents and exports CoNLL files.
//!
//! The core (offset mapping, annotation store, rendering, controller) is
//! plain Rust and runs natively in tests. The browser front end is compiled
//! only for `wasm32`.

pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod model;
pub mod offset;
pub mod render;
pub mod session;
pub mod store;
pub mod sync;

pub use config::{ClientConfig, ConfigError, LogLevel};
pub use controller::{Command, Controller, Effect, Message, Update, View, dispatch};
pub use error::AnnotationError;
pub use gateway::{BackendGateway, GatewayError, Transport};
pub use model::{Annotation, DocId, Document, Label, Selection, Span};
pub use session::Session;
pub use store::AnnotationStore;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
mod wasm_dom;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
