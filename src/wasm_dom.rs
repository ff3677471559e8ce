//! DOM access for the browser build.
//!
//! [`Page`] holds the elements of the host page and draws a [`View`] into
//! them. [`DomSelectionSource`] reads the browser selection and maps it to
//! text offsets through [`RenderedRuns`].

use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Blob, BlobPropertyBag, Document, Element, HtmlAnchorElement, HtmlElement, HtmlInputElement,
    HtmlTextAreaElement, Node, Url,
};

use crate::controller::View;
use crate::gateway::{BackendStatus, ExportedFile};
use crate::model::Span;
use crate::offset::{Boundary, RenderedRuns, SelectionSource, utf16_to_char_offset};
use crate::render::Segment;

/// Element ids the host page provides.
pub mod ids {
    pub const TEXT_CONTAINER: &str = "text-container";
    pub const DOC_INFO: &str = "doc-info";
    pub const ANNOTATIONS: &str = "annotations";
    pub const BACKEND_STATUS: &str = "backend-status";
    pub const SYNC_STATUS: &str = "sync-status";
    pub const BACKEND_URL: &str = "backend-url";
    pub const SET_BACKEND: &str = "set-backend";
    pub const DIR_PATH: &str = "dir-path";
    pub const OUT_DIR_PATH: &str = "out-dir-path";
    pub const SET_DIR: &str = "set-dir";
    pub const LABELS: &str = "labels";
    pub const UPLOAD_FORM: &str = "upload-form";
    pub const TEXT_INPUT: &str = "text-input";
    pub const FILE_INPUT: &str = "file-input";
    pub const SAVE_SELECTION: &str = "save-selection";
    pub const EXPORT_BTN: &str = "export-btn";
}

/// Look up an element by id, warning when the page lacks it.
pub fn element(document: &Document, id: &str) -> Option<Element> {
    let found = document.get_element_by_id(id);
    if found.is_none() {
        log::warn!("Element #{id} not found; skipping");
    }
    found
}

/// Look up an element by id and cast it.
pub fn element_as<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    element(document, id).and_then(|e| e.dyn_into::<T>().ok())
}

/// Current value of an `<input>`, or `""` if absent.
pub fn input_value(document: &Document, id: &str) -> String {
    element_as::<HtmlInputElement>(document, id).map_or_else(String::new, |i| i.value())
}

/// Current value of a `<textarea>`, or `""` if absent.
pub fn textarea_value(document: &Document, id: &str) -> String {
    element_as::<HtmlTextAreaElement>(document, id).map_or_else(String::new, |t| t.value())
}

/// Elements the view draws into.
#[derive(Debug, Clone)]
pub struct Page {
    document: Document,
    text_container: Option<Element>,
    doc_info: Option<Element>,
    annotations: Option<Element>,
    backend_status: Option<HtmlElement>,
    sync_status: Option<Element>,
    backend_url: Option<HtmlInputElement>,
    labels: Option<Element>,
}

impl Page {
    /// Bind to the elements of `document`.
    pub fn bind(document: Document) -> Self {
        Self {
            text_container: element(&document, ids::TEXT_CONTAINER),
            doc_info: element(&document, ids::DOC_INFO),
            annotations: element(&document, ids::ANNOTATIONS),
            backend_status: element_as(&document, ids::BACKEND_STATUS),
            sync_status: element(&document, ids::SYNC_STATUS),
            backend_url: element_as(&document, ids::BACKEND_URL),
            labels: element(&document, ids::LABELS),
            document,
        }
    }

    /// The bound document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The text container, if present.
    pub fn text_container(&self) -> Option<&Element> {
        self.text_container.as_ref()
    }

    /// Redraw everything derived from the session.
    pub fn render(&self, view: &View) -> Result<(), JsValue> {
        if let Some(info) = &self.doc_info {
            info.set_text_content(Some(&view.doc_info));
        }
        self.render_sync_status(&view.sync_status);
        if let Some(container) = &self.text_container {
            self.render_text(container, &view.segments)?;
        }
        if let Some(list) = &self.annotations {
            list.set_text_content(None);
            for row in &view.rows {
                let item = self.document.create_element("li")?;
                item.set_text_content(Some(&row.to_string()));
                let delete = self.document.create_element("button")?;
                delete.set_text_content(Some("Delete"));
                delete.set_attribute("type", "button")?;
                delete.set_attribute("data-index", &row.index.to_string())?;
                item.append_child(&delete)?;
                list.append_child(&item)?;
            }
        }
        if let Some(labels) = &self.labels {
            labels.set_text_content(None);
            for label in &view.labels {
                let button = self.document.create_element("button")?;
                button.set_attribute("type", "button")?;
                button.set_class_name(if *label == view.active_label {
                    "label-btn active"
                } else {
                    "label-btn"
                });
                button.set_attribute("data-label", label.as_str())?;
                button.set_text_content(Some(label.as_str()));
                labels.append_child(&button)?;
            }
        }
        Ok(())
    }

    /// One text node per plain run, one `span.annot` per highlight.
    fn render_text(&self, container: &Element, segments: &[Segment]) -> Result<(), JsValue> {
        container.set_text_content(None);
        for segment in segments {
            match segment {
                Segment::Plain { text, .. } => {
                    container.append_child(&self.document.create_text_node(text))?;
                }
                Segment::Highlight {
                    start,
                    end,
                    label,
                    text,
                } => {
                    let span = self.document.create_element("span")?;
                    span.set_class_name("annot");
                    span.set_attribute("data-label", label.as_str())?;
                    span.set_attribute("data-start", &start.to_string())?;
                    span.set_attribute("data-end", &end.to_string())?;
                    span.set_text_content(Some(text));
                    container.append_child(&span)?;
                }
            }
        }
        Ok(())
    }

    /// Update the availability indicator.
    pub fn render_status(&self, status: &BackendStatus, line: &str) {
        let Some(el) = &self.backend_status else {
            return;
        };
        el.set_text_content(Some(line));
        let color = match status {
            BackendStatus::Unknown => "gray",
            BackendStatus::Available => "green",
            BackendStatus::Unavailable { .. } => "red",
        };
        if let Err(err) = el.style().set_property("color", color) {
            log::warn!("Failed to color status: {err:?}");
        }
    }

    /// Update the save indicator.
    pub fn render_sync_status(&self, line: &str) {
        if let Some(el) = &self.sync_status {
            el.set_text_content(Some(line));
        }
    }

    /// Reflect the backend URL in its input.
    pub fn show_backend_url(&self, url: &str) {
        if let Some(input) = &self.backend_url {
            input.set_value(url);
        }
    }

    /// Blocking message box.
    pub fn alert(&self, message: &str) {
        log::debug!("Alert: {message}");
        if let Some(window) = web_sys::window() {
            if let Err(err) = window.alert_with_message(message) {
                log::error!("alert() failed: {err:?}");
            }
        }
    }

    /// Save `file` through a temporary object URL.
    pub fn download(&self, file: &ExportedFile) -> Result<(), JsValue> {
        let parts = Array::of1(&Uint8Array::from(file.bytes.as_slice()));
        let options = BlobPropertyBag::new();
        options.set_type("text/plain");
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;

        let anchor: HtmlAnchorElement = self.document.create_element("a")?.dyn_into()?;
        anchor.set_href(&url);
        anchor.set_download(&file.file_name);
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("No body"))?;
        body.append_child(&anchor)?;
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url)?;
        log::info!("Downloaded {} ({} bytes)", file.file_name, file.bytes.len());
        Ok(())
    }

    /// Drop the browser selection.
    pub fn clear_selection(&self) {
        let selection = web_sys::window().and_then(|w| w.get_selection().ok().flatten());
        if let Some(selection) = selection {
            if let Err(err) = selection.remove_all_ranges() {
                log::warn!("Failed to clear selection: {err:?}");
            }
        }
    }
}

/// Reads the browser selection inside the text container.
#[derive(Debug, Clone)]
pub struct DomSelectionSource {
    container: Option<Element>,
}

impl DomSelectionSource {
    /// Track selections inside `container`.
    pub fn new(container: Option<Element>) -> Self {
        Self { container }
    }

    fn runs(container: &Element) -> RenderedRuns {
        let children = container.child_nodes();
        let lengths = (0..children.length())
            .map(|i| {
                children
                    .item(i)
                    .and_then(|node| node.text_content())
                    .map_or(0, |text| text.chars().count())
            })
            .collect();
        RenderedRuns::new(lengths)
    }

    /// Locate a DOM range boundary relative to the container's children.
    fn boundary(container: &Element, node: &Node, offset: u32) -> Option<Boundary> {
        let container_node: &Node = container.as_ref();
        if node.is_same_node(Some(container_node)) {
            return Some(Boundary::Child {
                index: offset as usize,
            });
        }

        // Walk up to the top-level run holding `node`.
        let mut top = node.clone();
        loop {
            let parent = top.parent_node()?;
            if parent.is_same_node(Some(container_node)) {
                break;
            }
            top = parent;
        }
        let children = container.child_nodes();
        let run = (0..children.length())
            .position(|i| children.item(i).is_some_and(|c| c.is_same_node(Some(&top))))?;

        let offset = if node.node_type() == Node::TEXT_NODE {
            let text = node.text_content().unwrap_or_default();
            utf16_to_char_offset(&text, offset as usize)
        } else if offset == 0 {
            0
        } else {
            // After some child of the run: clamped to the run's end.
            usize::MAX
        };
        Some(Boundary::Text { run, offset })
    }
}

impl SelectionSource for DomSelectionSource {
    fn current(&self) -> Option<Span> {
        let container = self.container.as_ref()?;
        let selection = web_sys::window()?.get_selection().ok()??;
        if selection.range_count() == 0 {
            return None;
        }
        let range = selection.get_range_at(0).ok()?;
        let start = Self::boundary(
            container,
            &range.start_container().ok()?,
            range.start_offset().ok()?,
        )?;
        let end = Self::boundary(
            container,
            &range.end_container().ok()?,
            range.end_offset().ok()?,
        )?;
        Self::runs(container).map(start, end)
    }

    fn clear(&self) {
        let selection = web_sys::window().and_then(|w| w.get_selection().ok().flatten());
        if let Some(selection) = selection {
            // Nothing to recover if the browser refuses.
            let _ = selection.remove_all_ranges();
        }
    }
}
