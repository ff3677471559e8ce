//! Controller: wires UI events to the session and the backend.
//!
//! [`Controller::update`] is synchronous and never touches the network. It
//! mutates the session and returns an [`Update`] listing view [`Effect`]s and
//! network [`Command`]s. [`dispatch`] runs the commands against a
//! [`BackendGateway`](crate::gateway::BackendGateway) and feeds every result
//! back through `update`.

mod dispatch;
mod message;


pub use dispatch::{dispatch, dispatch_with, execute};
pub use message::{Command, Effect, Message, Update};

use crate::config::ClientConfig;
use crate::error::AnnotationError;
use crate::gateway::{
    AdvanceOutcome, BackendStatus, DirectoryOutcome, DocumentContent, ExportedFile, GatewayError,
    LoadedDocument, PushAck, UploadPayload, normalize_base_url,
};
use crate::model::{DocId, Document, Label};
use crate::offset::{SelectionSource, SelectionTracker};
use crate::render::{
    ListRow, Segment, backend_status_line, doc_info, highlight_segments, list_rows,
    sync_status_line,
};
use crate::session::Session;
use crate::sync::SyncQueue;

/// Everything the view needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// `Document: {id} | Annotations: {n}`
    pub doc_info: String,
    /// Text runs for the container.
    pub segments: Vec<Segment>,
    /// Annotation list rows.
    pub rows: Vec<ListRow>,
    /// Label palette.
    pub labels: Vec<Label>,
    /// Label applied to new annotations.
    pub active_label: Label,
    /// Save indicator for the current document.
    pub sync_status: String,
}

/// Client-side application state and event handling.
#[derive(Debug)]
pub struct Controller<S> {
    config: ClientConfig,
    session: Session,
    tracker: SelectionTracker,
    sync: SyncQueue,
    source: S,
    backend_url: String,
    status: BackendStatus,
    /// Export requested while a push for this document was outstanding.
    pending_export: Option<DocId>,
}

impl<S: SelectionSource> Controller<S> {
    /// Create a controller with no document loaded.
    pub fn new(config: ClientConfig, source: S, backend_url: impl Into<String>) -> Self {
        let session = Session::new(config.default_label());
        Self {
            config,
            session,
            tracker: SelectionTracker::new(),
            sync: SyncQueue::new(),
            source,
            backend_url: backend_url.into(),
            status: BackendStatus::Unknown,
            pending_export: None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Selection cache.
    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    /// Push bookkeeping.
    pub fn sync(&self) -> &SyncQueue {
        &self.sync
    }

    /// The selection source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Backend base URL as last set.
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Backend availability as last observed.
    pub fn status(&self) -> &BackendStatus {
        &self.status
    }

    /// Text for the availability indicator.
    pub fn status_line(&self) -> String {
        backend_status_line(&self.status, &self.backend_url)
    }

    /// Text for the save indicator of the current document.
    pub fn sync_line(&self) -> String {
        let Some(doc_id) = self.session.doc_id() else {
            return String::new();
        };
        let export_waiting = self.pending_export.as_ref() == Some(doc_id);
        sync_status_line(&self.sync.state(doc_id), export_waiting)
    }

    /// Snapshot of what should be on screen.
    pub fn view(&self) -> View {
        let text = self.session.text();
        let annotations = self.session.annotations();
        View {
            doc_info: doc_info(self.session.doc_id(), annotations.len()),
            segments: highlight_segments(text, annotations),
            rows: list_rows(text, annotations),
            labels: self.config.labels(),
            active_label: self.session.active_label().clone(),
            sync_status: self.sync_line(),
        }
    }

    /// Handle one message.
    pub fn update(&mut self, message: Message) -> Update {
        let mut update = Update::none();
        match message {
            Message::SetBackendUrl(url) => self.handle_set_backend_url(&url, &mut update),
            Message::Ping => update.command(Command::CheckBackend),
            Message::SetDirectory { path, output_path } => {
                self.handle_set_directory(&path, output_path.as_deref(), &mut update);
            }
            Message::Upload(payload) => self.handle_upload(payload, &mut update),
            Message::PointerReleased => self.tracker.capture(&self.source),
            Message::SelectLabel(label) => {
                self.session.set_active_label(label);
                update.effect(Effect::Render);
                self.annotate_selection(false, &mut update);
            }
            Message::SaveSelection => self.annotate_selection(true, &mut update),
            Message::RemoveAnnotation(index) => self.handle_remove(index, &mut update),
            Message::Export => self.handle_export(&mut update),

            Message::BackendChecked(status) => {
                log::debug!("Backend status: {status:?}");
                self.status = status.clone();
                update.effect(Effect::Status(status));
            }
            Message::DirectoryLoaded(result) => self.handle_directory_loaded(result, &mut update),
            Message::Uploaded(result) => match result {
                Ok(doc_id) => update.command(Command::FetchText(doc_id)),
                Err(err) => {
                    log::error!("Upload failed: {err}");
                    update.alert(format!("Upload failed: {err}"));
                }
            },
            Message::TextFetched { doc_id, result } => {
                self.handle_text_fetched(doc_id, result, &mut update);
            }
            Message::AnnotationsPushed { doc_id, result } => {
                self.handle_pushed(doc_id, result, &mut update);
            }
            Message::Exported { doc_id, result } => {
                self.handle_exported(doc_id, result, &mut update);
            }
            Message::Advanced {
                prev_doc_id,
                result,
            } => self.handle_advanced(&prev_doc_id, result, &mut update),
        }
        update
    }

    fn handle_set_backend_url(&mut self, url: &str, update: &mut Update) {
        if url.trim().is_empty() {
            return;
        }
        let Some(normalized) = normalize_base_url(url) else {
            log::warn!("Rejected backend URL '{url}'");
            update.alert(format!("Invalid backend URL '{}'", url.trim()));
            return;
        };
        self.backend_url = normalized.clone();
        self.status = BackendStatus::Unknown;
        update.effect(Effect::BackendUrlChanged(normalized));
        update.effect(Effect::Status(BackendStatus::Unknown));
        update.command(Command::CheckBackend);
    }

    fn handle_set_directory(&mut self, path: &str, output_path: Option<&str>, update: &mut Update) {
        let path = path.trim();
        if path.is_empty() {
            update.alert("Provide a directory path on the server");
            return;
        }
        let output_path = output_path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        update.command(Command::LoadDirectory {
            path: path.to_string(),
            output_path,
        });
    }

    fn handle_upload(&mut self, payload: UploadPayload, update: &mut Update) {
        if let UploadPayload::Text(text) = &payload {
            if text.trim().is_empty() {
                update.alert("Enter some text or choose a file to upload");
                return;
            }
        }
        update.command(Command::Upload(payload));
    }

    /// Annotate the live or cached selection with the active label.
    ///
    /// With `explicit` false a missing selection is silently ignored.
    fn annotate_selection(&mut self, explicit: bool, update: &mut Update) {
        let Some(document) = self.session.document() else {
            if explicit {
                update.alert(AnnotationError::NoDocument.to_string());
            }
            return;
        };
        let Some(selection) = self.tracker.resolve(&self.source, document) else {
            if explicit {
                update.alert(AnnotationError::NoSelection.to_string());
            }
            return;
        };

        match self.session.annotate(&selection) {
            Ok(index) => {
                log::debug!(
                    "Annotated '{}' ({}-{}) as {} at {index}",
                    selection.text,
                    selection.span.start,
                    selection.span.end,
                    self.session.active_label()
                );
                self.tracker.clear(&self.source);
                update.effect(Effect::ClearSelection);
                update.effect(Effect::Render);
                self.queue_push(update);
            }
            Err(err) => {
                log::warn!("Annotation rejected: {err}");
                update.alert(err.to_string());
            }
        }
    }

    fn handle_remove(&mut self, index: usize, update: &mut Update) {
        match self.session.remove(index) {
            Ok(removed) => {
                log::debug!("Removed {}-{} {}", removed.start, removed.end, removed.label);
                update.effect(Effect::Render);
                self.queue_push(update);
            }
            Err(err) => {
                log::warn!("Remove rejected: {err}");
                update.alert(err.to_string());
            }
        }
    }

    fn queue_push(&mut self, update: &mut Update) {
        let Some(doc_id) = self.session.doc_id().cloned() else {
            return;
        };
        let snapshot = self.session.store().to_vec();
        if let Some(job) = self.sync.enqueue(doc_id, snapshot) {
            update.command(Command::PushAnnotations(job));
        }
    }

    fn handle_export(&mut self, update: &mut Update) {
        let Some(doc_id) = self.session.doc_id().cloned() else {
            update.alert("No document to export");
            return;
        };
        if self.sync.is_in_flight(&doc_id) {
            log::info!("Export of {doc_id} waits for the outstanding push");
            self.pending_export = Some(doc_id);
            update.effect(Effect::SyncStatus(self.sync_line()));
            return;
        }
        update.command(Command::Export(doc_id));
    }

    fn load(&mut self, loaded: LoadedDocument, update: &mut Update) {
        let dropped = self.session.load(loaded.document, loaded.annotations);
        if dropped > 0 {
            log::warn!("Dropped {dropped} invalid annotations from the backend");
        }
        self.tracker.forget();
        self.sync.prune(self.session.doc_id());
        update.effect(Effect::Render);
    }

    fn handle_directory_loaded(
        &mut self,
        result: Result<DirectoryOutcome, GatewayError>,
        update: &mut Update,
    ) {
        match result {
            Ok(DirectoryOutcome::Loaded(loaded)) => self.load(loaded, update),
            Ok(DirectoryOutcome::Empty { message }) => {
                log::info!("Directory empty: {message}");
                update.alert(message);
            }
            Err(err) => {
                log::error!("Set directory failed: {err}");
                update.alert(format!("Set directory failed: {err}"));
            }
        }
    }

    fn handle_text_fetched(
        &mut self,
        doc_id: DocId,
        result: Result<DocumentContent, GatewayError>,
        update: &mut Update,
    ) {
        match result {
            Ok(content) => {
                let loaded = LoadedDocument {
                    document: Document::new(doc_id, content.text),
                    annotations: content.annotations,
                };
                self.load(loaded, update);
            }
            Err(err) => {
                log::error!("Fetching text of {doc_id} failed: {err}");
                update.alert(format!("Upload error: {err}"));
            }
        }
    }

    fn handle_pushed(
        &mut self,
        doc_id: DocId,
        result: Result<PushAck, GatewayError>,
        update: &mut Update,
    ) {
        let outcome = match result {
            Ok(ack) => {
                log::debug!("Push for {doc_id} acknowledged: {ack:?}");
                Ok(())
            }
            Err(err) => Err(err.to_string()),
        };
        if let Some(job) = self.sync.complete(&doc_id, outcome) {
            update.command(Command::PushAnnotations(job));
            return;
        }

        let current = self.session.is_current(&doc_id);
        if current && self.sync.last_error(&doc_id).is_none() {
            self.session.store_mut().clear_dirty();
        }
        if self.pending_export.as_ref() == Some(&doc_id) {
            self.pending_export = None;
            if current {
                update.command(Command::Export(doc_id));
            } else {
                log::info!("Dropping deferred export of {doc_id}: no longer current");
            }
        }
        if current {
            update.effect(Effect::SyncStatus(self.sync_line()));
        }
    }

    fn handle_exported(
        &mut self,
        doc_id: DocId,
        result: Result<Vec<u8>, GatewayError>,
        update: &mut Update,
    ) {
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("Export of {doc_id} failed: {err}");
                update.alert(format!("Export error: {err}"));
                return;
            }
        };
        update.effect(Effect::Download(ExportedFile::for_document(
            &doc_id,
            &self.config.export_extension,
            bytes,
        )));
        if self.session.is_current(&doc_id) {
            update.command(Command::Advance(doc_id));
        } else {
            log::debug!("Not advancing past {doc_id}: no longer current");
        }
    }

    fn handle_advanced(
        &mut self,
        prev_doc_id: &DocId,
        result: Result<AdvanceOutcome, GatewayError>,
        update: &mut Update,
    ) {
        if !self.session.is_current(prev_doc_id) {
            log::debug!("Ignoring advance result for {prev_doc_id}: no longer current");
            return;
        }
        match result {
            Ok(AdvanceOutcome::Next(loaded)) => self.load(loaded, update),
            Ok(AdvanceOutcome::Exhausted { message }) => {
                log::info!("Queue exhausted after {prev_doc_id}: {message}");
                update.alert(message);
                self.unload(update);
            }
            Err(err) => {
                log::error!("Advancing past {prev_doc_id} failed: {err}");
                update.alert(format!("No next file: {err}"));
                self.unload(update);
            }
        }
    }

    fn unload(&mut self, update: &mut Update) {
        self.session.clear();
        self.tracker.forget();
        self.sync.prune(None);
        update.effect(Effect::Render);
    }
}
