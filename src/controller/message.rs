//! Controller message types.
//!
//! All UI events and backend results are represented as messages in the Elm
//! architecture style. `update` turns a message into [`Effect`]s for the view
//! and [`Command`]s for the network; command results come back as messages.

use crate::gateway::{
    AdvanceOutcome, BackendStatus, DirectoryOutcome, DocumentContent, ExportedFile, GatewayError,
    PushAck, UploadPayload,
};
use crate::model::{DocId, Label};
use crate::sync::PushJob;

/// Messages that can be sent to update controller state.
#[derive(Debug)]
pub enum Message {
    // Backend
    /// Point the client at another backend
    SetBackendUrl(String),
    /// Probe backend availability
    Ping,
    /// Open a server-side directory
    SetDirectory {
        /// Input directory on the server
        path: String,
        /// Output directory for exports (blank means backend default)
        output_path: Option<String>,
    },
    /// Upload a file or raw text
    Upload(UploadPayload),

    // Annotation
    /// Pointer released over the text container
    PointerReleased,
    /// Label button clicked
    SelectLabel(Label),
    /// Save-selection button clicked
    SaveSelection,
    /// Delete button of a list row clicked
    RemoveAnnotation(usize),
    /// Export button clicked
    Export,

    // Results
    /// Liveness probe finished
    BackendChecked(BackendStatus),
    /// Directory request finished
    DirectoryLoaded(Result<DirectoryOutcome, GatewayError>),
    /// Upload finished
    Uploaded(Result<DocId, GatewayError>),
    /// Text of a freshly uploaded document fetched
    TextFetched {
        /// Document the text belongs to
        doc_id: DocId,
        /// Fetched content
        result: Result<DocumentContent, GatewayError>,
    },
    /// Annotation push finished
    AnnotationsPushed {
        /// Document the push was for
        doc_id: DocId,
        /// Acknowledgement
        result: Result<PushAck, GatewayError>,
    },
    /// Export finished
    Exported {
        /// Exported document
        doc_id: DocId,
        /// File contents
        result: Result<Vec<u8>, GatewayError>,
    },
    /// Request for the next document finished
    Advanced {
        /// Document that was marked done
        prev_doc_id: DocId,
        /// Next document or exhaustion
        result: Result<AdvanceOutcome, GatewayError>,
    },
}

/// Network requests to run against the backend gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `GET /list`
    CheckBackend,
    /// `POST /set-directory`
    LoadDirectory {
        /// Input directory
        path: String,
        /// Output directory
        output_path: Option<String>,
    },
    /// `POST /upload-text`
    Upload(UploadPayload),
    /// `GET /text/{doc_id}`
    FetchText(DocId),
    /// `POST /annotate/{doc_id}`
    PushAnnotations(PushJob),
    /// `GET /export/{doc_id}`
    Export(DocId),
    /// `POST /next`
    Advance(DocId),
}

/// Changes the view must apply, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Redraw document info, highlighted text, list and label buttons
    Render,
    /// Show a blocking message to the user
    Alert(String),
    /// Update the availability indicator
    Status(BackendStatus),
    /// Offer a file for download
    Download(ExportedFile),
    /// Drop the browser selection
    ClearSelection,
    /// Backend base URL changed; later requests must use it
    BackendUrlChanged(String),
    /// Update the save indicator
    SyncStatus(String),
}

/// Output of one `update` step.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Update {
    /// View changes, in order.
    pub effects: Vec<Effect>,
    /// Requests to send, in order.
    pub commands: Vec<Command>,
}

impl Update {
    /// Nothing to do.
    pub fn none() -> Self {
        Self::default()
    }

    /// Append an effect.
    pub fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Append an alert.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.effects.push(Effect::Alert(message.into()));
    }

    /// Append a command.
    pub fn command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Check if neither effects nor commands were produced.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.commands.is_empty()
    }
}
