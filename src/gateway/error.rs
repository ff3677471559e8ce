//! Error types for backend requests.

use thiserror::Error;

/// Errors that can occur while talking to the backend.
///
/// None of these are retried. The controller logs them and shows an alert;
/// client state is left as it was before the request.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Network failure or request construction error
    #[error("Request failed: {message}")]
    Transport {
        /// Description from the network layer
        message: String,
    },

    /// Backend answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsed but lacks fields required by its status
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// What was missing or inconsistent
        message: String,
    },

    /// Backend base URL is not an http(s) URL
    #[error("Invalid backend URL '{url}'")]
    InvalidBaseUrl {
        /// The rejected URL
        url: String,
    },
}

impl GatewayError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Short text for the availability indicator.
    pub fn status_reason(&self) -> String {
        match self {
            Self::Status { status, .. } => format!("HTTP {status}"),
            Self::Transport { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
