//! Request and response shapes exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::model::{Annotation, DocId, Document};

use super::GatewayError;

/// Status value the backend uses for success envelopes.
pub const STATUS_OK: &str = "ok";

/// Body of `POST /set-directory`.
#[derive(Debug, Serialize)]
pub(crate) struct SetDirectoryRequest<'a> {
    pub path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<&'a str>,
}

/// Body of `POST /annotate/{doc_id}`.
#[derive(Debug, Serialize)]
pub(crate) struct AnnotateRequest<'a> {
    pub annotations: &'a [Annotation],
}

/// Body of `POST /next`.
#[derive(Debug, Serialize)]
pub(crate) struct NextRequest<'a> {
    pub prev_doc_id: &'a DocId,
}

/// Response of `POST /upload-text`.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub doc_id: DocId,
}

/// `{status, ...}` envelope returned by `/set-directory` and `/next`.
#[derive(Debug, Deserialize)]
pub(crate) struct DocumentEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub doc_id: Option<DocId>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub annotations: Option<Vec<Annotation>>,
}

impl DocumentEnvelope {
    /// Split into a loaded document (status ok) or the backend's message.
    pub fn into_outcome(self) -> Result<Result<LoadedDocument, String>, GatewayError> {
        if self.status != STATUS_OK {
            return Ok(Err(self.message.unwrap_or_default()));
        }
        let doc_id = self
            .doc_id
            .ok_or_else(|| GatewayError::malformed("status ok without doc_id"))?;
        let text = self
            .text
            .ok_or_else(|| GatewayError::malformed("status ok without text"))?;
        Ok(Ok(LoadedDocument {
            document: Document::new(doc_id, text),
            annotations: self.annotations.unwrap_or_default(),
        }))
    }
}

/// Response of `GET /text/{doc_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentContent {
    /// Canonical, normalized text.
    pub text: String,
    /// Annotations already stored for the document.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub annotations: Vec<Annotation>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Annotation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Annotation>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Acknowledgement of `POST /annotate/{doc_id}`. Both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushAck {
    /// Backend status string
    #[serde(default)]
    pub status: Option<String>,
    /// Number of annotations stored
    #[serde(default)]
    pub count: Option<usize>,
}

/// A document together with the annotations the backend holds for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    /// The document.
    pub document: Document,
    /// Authoritative annotation set.
    pub annotations: Vec<Annotation>,
}

/// Result of pointing the backend at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryOutcome {
    /// First document of the directory.
    Loaded(LoadedDocument),
    /// No usable files; carries the backend's message.
    Empty {
        /// Message to show the user
        message: String,
    },
}

/// Result of asking for the next document in the server-side queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Next document in the queue.
    Next(LoadedDocument),
    /// Queue is exhausted; carries the backend's message.
    Exhausted {
        /// Message to show the user
        message: String,
    },
}

/// What to upload: a file picked by the user or pasted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPayload {
    /// Raw text typed or pasted into the form
    Text(String),
    /// File contents
    File {
        /// Original file name
        name: String,
        /// File bytes
        bytes: Vec<u8>,
    },
}

/// An exported annotation file, ready to hand to the browser as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// Suggested download name, `annotations_{doc_id}.{extension}`.
    pub file_name: String,
    /// File contents as returned by the backend.
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Name the export after its document.
    pub fn for_document(doc_id: &DocId, extension: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("annotations_{doc_id}.{extension}"),
            bytes,
        }
    }
}

/// Backend availability as last observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendStatus {
    /// Not probed yet.
    #[default]
    Unknown,
    /// Liveness probe succeeded.
    Available,
    /// Liveness probe failed.
    Unavailable {
        /// Short reason (`HTTP 503`, network message)
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok() {
        let json = r#"{"status":"ok","doc_id":"a1","text":"Paris","annotations":[{"start":0,"end":5,"label":"LOC","text":"Paris"}]}"#;
        let env: DocumentEnvelope = serde_json::from_str(json).unwrap();
        let loaded = env.into_outcome().unwrap().unwrap();
        assert_eq!(loaded.document.id().as_str(), "a1");
        assert_eq!(loaded.annotations, vec![Annotation::new(0, 5, "LOC")]);
    }

    #[test]
    fn test_envelope_null_annotations() {
        let json = r#"{"status":"ok","doc_id":"a1","text":"x","annotations":null}"#;
        let env: DocumentEnvelope = serde_json::from_str(json).unwrap();
        assert!(env.into_outcome().unwrap().unwrap().annotations.is_empty());
    }

    #[test]
    fn test_envelope_other_status_carries_message() {
        let json = r#"{"status":"empty","message":"No files found"}"#;
        let env: DocumentEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.into_outcome().unwrap(), Err("No files found".to_string()));
    }

    #[test]
    fn test_envelope_ok_without_text_is_malformed() {
        let json = r#"{"status":"ok","doc_id":"a1"}"#;
        let env: DocumentEnvelope = serde_json::from_str(json).unwrap();
        assert!(matches!(
            env.into_outcome(),
            Err(GatewayError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_set_directory_omits_missing_output_path() {
        let body = SetDirectoryRequest {
            path: "/data/in",
            output_path: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"path":"/data/in"}"#
        );
    }

    #[test]
    fn test_document_content_null_annotations() {
        let content: DocumentContent =
            serde_json::from_str(r#"{"text":"abc","annotations":null}"#).unwrap();
        assert!(content.annotations.is_empty());
    }

    #[test]
    fn test_export_file_name() {
        let file = ExportedFile::for_document(&DocId::new("42"), "conll", Vec::new());
        assert_eq!(file.file_name, "annotations_42.conll");
    }
}
