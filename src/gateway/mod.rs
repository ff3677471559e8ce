//! Backend gateway: HTTP access to the annotation backend.
//!
//! The backend owns document storage, annotation persistence, CoNLL export
//! and directory iteration. This module only maps those endpoints to typed
//! calls:
//!
//! | Call | Endpoint |
//! |------|----------|
//! | [`BackendGateway::load_directory`] | `POST /set-directory` |
//! | [`BackendGateway::upload`] | `POST /upload-text` |
//! | [`BackendGateway::fetch_text`] | `GET /text/{doc_id}` |
//! | [`BackendGateway::push_annotations`] | `POST /annotate/{doc_id}` |
//! | [`BackendGateway::export`] | `GET /export/{doc_id}` |
//! | [`BackendGateway::advance`] | `POST /next` |
//! | [`BackendGateway::health_check`] | `GET /list` |

mod client;
mod error;
mod transport;
mod types;

#[cfg(target_arch = "wasm32")]
mod fetch;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{BackendGateway, DEFAULT_BACKEND_PORT, default_base_url, normalize_base_url};
pub use error::GatewayError;
pub use transport::{
    FormField, FormValue, HttpRequest, HttpResponse, Method, RequestBody, Transport,
};
pub use types::{
    AdvanceOutcome, BackendStatus, DirectoryOutcome, DocumentContent, ExportedFile,
    LoadedDocument, PushAck, STATUS_OK, UploadPayload,
};

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchTransport;
