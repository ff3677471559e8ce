//! Platform-neutral HTTP request/response types and the transport seam.
//!
//! The gateway builds [`HttpRequest`]s and parses [`HttpResponse`]s; a
//! [`Transport`] moves them over the wire. On wasm that is `window.fetch`
//! (see `gateway::fetch`); tests use an in-memory transport.

use std::future::Future;

use serde::de::DeserializeOwned;

use super::GatewayError;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
}

impl Method {
    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Value of a multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Plain text field
    Text(String),
    /// File field
    File {
        /// File name reported to the server
        file_name: String,
        /// Raw file contents
        bytes: Vec<u8>,
    },
}

/// One multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Field name
    pub name: String,
    /// Field value
    pub value: FormValue,
}

impl FormField {
    /// Create a text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    /// Create a file field.
    pub fn file(name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                bytes,
            },
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// Serialized JSON, sent with `Content-Type: application/json`
    Json(String),
    /// Multipart form; the transport picks the boundary
    Form(Vec<FormField>),
}

/// A request ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Body
    pub body: RequestBody,
}

impl HttpRequest {
    /// GET request without a body.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: RequestBody::Empty,
        }
    }

    /// POST request with a JSON body.
    pub fn post_json<B: serde::Serialize>(
        url: impl Into<String>,
        body: &B,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            method: Method::Post,
            url: url.into(),
            body: RequestBody::Json(serde_json::to_string(body)?),
        })
    }

    /// POST request with a multipart form body.
    pub fn post_form(url: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: RequestBody::Form(fields),
        }
    }
}

/// A received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a non-2xx response into [`GatewayError::Status`].
    pub fn error_for_status(self) -> Result<Self, GatewayError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GatewayError::Status {
                status: self.status,
                body: self.text(),
            })
        }
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Moves requests to the backend and brings responses back.
///
/// Implementations report network failures as [`GatewayError::Transport`]
/// and return every HTTP response, whatever its status.
pub trait Transport {
    /// Send one request.
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, GatewayError>>;
}
