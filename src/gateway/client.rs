//! Backend API client.
//!
//! One method per endpoint. Each builds a request, sends it through the
//! [`Transport`], and maps the response into a typed result. Calls are
//! independent of each other and never retried.

use std::cell::RefCell;

use crate::model::{Annotation, DocId};

use super::GatewayError;
use super::transport::{FormField, HttpRequest, Transport};
use super::types::{
    AdvanceOutcome, AnnotateRequest, BackendStatus, DirectoryOutcome, DocumentContent,
    DocumentEnvelope, NextRequest, PushAck, SetDirectoryRequest, UploadPayload, UploadResponse,
};

/// Port the backend listens on when no URL is configured.
pub const DEFAULT_BACKEND_PORT: u16 = 8001;

/// Default base URL for a page served from `hostname`.
pub fn default_base_url(hostname: &str) -> String {
    let host = if hostname.is_empty() {
        "localhost"
    } else {
        hostname
    };
    format!("http://{host}:{DEFAULT_BACKEND_PORT}")
}

/// Trim and validate a base URL. Returns `None` unless it is http(s).
pub fn normalize_base_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))?;
    (!rest.is_empty()).then(|| url.to_string())
}

/// HTTP client for the annotation backend.
#[derive(Debug)]
pub struct BackendGateway<T> {
    transport: T,
    /// Changed at runtime from the UI, hence the cell.
    base_url: RefCell<String>,
}

impl<T: Transport> BackendGateway<T> {
    /// Create a gateway. `base_url` must be an http(s) URL.
    pub fn new(transport: T, base_url: &str) -> Result<Self, GatewayError> {
        let base_url = normalize_base_url(base_url).ok_or_else(|| GatewayError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        Ok(Self {
            transport,
            base_url: RefCell::new(base_url),
        })
    }

    /// Current base URL.
    pub fn base_url(&self) -> String {
        self.base_url.borrow().clone()
    }

    /// Point subsequent requests at a different backend.
    pub fn set_base_url(&self, url: &str) -> Result<(), GatewayError> {
        let normalized = normalize_base_url(url).ok_or_else(|| GatewayError::InvalidBaseUrl {
            url: url.to_string(),
        })?;
        log::info!("Backend URL set to {normalized}");
        *self.base_url.borrow_mut() = normalized;
        Ok(())
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.borrow(), path)
    }

    fn doc_url(&self, prefix: &str, doc_id: &DocId) -> String {
        self.url(&format!("{prefix}/{}", urlencoding::encode(doc_id.as_str())))
    }

    /// `POST /set-directory`: load the first document found at a server path.
    pub async fn load_directory(
        &self,
        path: &str,
        output_path: Option<&str>,
    ) -> Result<DirectoryOutcome, GatewayError> {
        let body = SetDirectoryRequest { path, output_path };
        let request = HttpRequest::post_json(self.url("/set-directory"), &body)?;
        let response = self.transport.send(request).await?.error_for_status()?;
        let envelope: DocumentEnvelope = response.json()?;
        Ok(match envelope.into_outcome()? {
            Ok(loaded) => {
                log::info!("Directory {path} opened at document {}", loaded.document.id());
                DirectoryOutcome::Loaded(loaded)
            }
            Err(message) => DirectoryOutcome::Empty {
                message: if message.is_empty() {
                    "No files found".to_string()
                } else {
                    message
                },
            },
        })
    }

    /// `POST /upload-text`: upload a file or raw text, returning the new id.
    pub async fn upload(&self, payload: &UploadPayload) -> Result<DocId, GatewayError> {
        let field = match payload {
            UploadPayload::Text(text) => FormField::text("text", text.clone()),
            UploadPayload::File { name, bytes } => {
                FormField::file("file", name.clone(), bytes.clone())
            }
        };
        let request = HttpRequest::post_form(self.url("/upload-text"), vec![field]);
        let response = self.transport.send(request).await?.error_for_status()?;
        let uploaded: UploadResponse = response.json()?;
        log::info!("Uploaded document {}", uploaded.doc_id);
        Ok(uploaded.doc_id)
    }

    /// `GET /text/{doc_id}`: canonical text plus stored annotations.
    pub async fn fetch_text(&self, doc_id: &DocId) -> Result<DocumentContent, GatewayError> {
        let request = HttpRequest::get(self.doc_url("/text", doc_id));
        let response = self.transport.send(request).await?.error_for_status()?;
        response.json()
    }

    /// `POST /annotate/{doc_id}`: replace the backend's set with `annotations`.
    pub async fn push_annotations(
        &self,
        doc_id: &DocId,
        annotations: &[Annotation],
    ) -> Result<PushAck, GatewayError> {
        let body = AnnotateRequest { annotations };
        let request = HttpRequest::post_json(self.doc_url("/annotate", doc_id), &body)?;
        let response = self.transport.send(request).await?.error_for_status()?;
        // The acknowledgement body carries nothing the client depends on.
        Ok(response.json::<PushAck>().unwrap_or_default())
    }

    /// `GET /export/{doc_id}`: the annotation file as raw bytes.
    pub async fn export(&self, doc_id: &DocId) -> Result<Vec<u8>, GatewayError> {
        let request = HttpRequest::get(self.doc_url("/export", doc_id));
        let response = self.transport.send(request).await?.error_for_status()?;
        log::info!("Exported {} ({} bytes)", doc_id, response.body.len());
        Ok(response.body)
    }

    /// `POST /next`: mark `prev_doc_id` done and fetch the next document.
    pub async fn advance(&self, prev_doc_id: &DocId) -> Result<AdvanceOutcome, GatewayError> {
        let body = NextRequest { prev_doc_id };
        let request = HttpRequest::post_json(self.url("/next"), &body)?;
        let response = self.transport.send(request).await?.error_for_status()?;
        let envelope: DocumentEnvelope = response.json()?;
        Ok(match envelope.into_outcome()? {
            Ok(loaded) => AdvanceOutcome::Next(loaded),
            Err(message) => AdvanceOutcome::Exhausted {
                message: if message.is_empty() {
                    "No more files".to_string()
                } else {
                    message
                },
            },
        })
    }

    /// `GET /list`: liveness probe. Never fails; failures become `Unavailable`.
    pub async fn health_check(&self) -> BackendStatus {
        let request = HttpRequest::get(self.url("/list"));
        match self.transport.send(request).await {
            Ok(response) if response.is_success() => BackendStatus::Available,
            Ok(response) => BackendStatus::Unavailable {
                reason: format!("HTTP {}", response.status),
            },
            Err(err) => BackendStatus::Unavailable {
                reason: err.status_reason(),
            },
        }
    }
}
