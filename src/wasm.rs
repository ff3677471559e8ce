//! Browser entry point.
//!
//! The host page loads the module and calls [`start`] or
//! [`start_with_config`]. Every DOM event becomes a [`Message`] that is
//! dispatched on a local future.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, Event, HtmlInputElement};

use crate::config::ClientConfig;
use crate::controller::{Controller, Effect, Message, dispatch_with};
use crate::gateway::{BackendGateway, FetchTransport, UploadPayload};
use crate::model::Label;
use crate::wasm_dom::{DomSelectionSource, Page, element, element_as, ids, input_value, textarea_value};

thread_local! {
    /// The running client; kept alive for the lifetime of the page.
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

struct App {
    controller: RefCell<Controller<DomSelectionSource>>,
    gateway: BackendGateway<FetchTransport>,
    page: Page,
}

impl App {
    /// Dispatch `message` on a local future.
    fn send(self: &Rc<Self>, message: Message) {
        let app = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            dispatch_with(&app.controller, &app.gateway, message, |effect| app.apply(effect))
                .await;
        });
    }

    fn apply(&self, effect: Effect) {
        match effect {
            Effect::Render => self.render(),
            Effect::Alert(message) => self.page.alert(&message),
            Effect::Status(status) => {
                let line = self.controller.borrow().status_line();
                self.page.render_status(&status, &line);
            }
            Effect::Download(file) => {
                if let Err(err) = self.page.download(&file) {
                    log::error!("Download of {} failed: {err:?}", file.file_name);
                }
            }
            Effect::ClearSelection => self.page.clear_selection(),
            Effect::BackendUrlChanged(url) => self.page.show_backend_url(&url),
            Effect::SyncStatus(line) => self.page.render_sync_status(&line),
        }
    }

    fn render(&self) {
        let view = self.controller.borrow().view();
        if let Err(err) = self.page.render(&view) {
            log::error!("Render failed: {err:?}");
        }
    }
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Start with the default configuration.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    boot(ClientConfig::default())
}

/// Start with a JSON configuration (every field optional).
#[wasm_bindgen]
pub fn start_with_config(config: &str) -> Result<(), JsValue> {
    let config = ClientConfig::from_json(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    boot(config)
}

fn boot(config: ClientConfig) -> Result<(), JsValue> {
    if APP.with(|app| app.borrow().is_some()) {
        log::warn!("Client already started");
        return Ok(());
    }
    if let Err(err) = console_log::init_with_level(config.log_level.to_level()) {
        web_sys::console::warn_1(&format!("Logger already set: {err}").into());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;
    let hostname = window.location().hostname().unwrap_or_default();
    let backend_url = config.backend_url_for(&hostname);
    log::info!("Annotation client starting; backend at {backend_url}");

    let gateway = BackendGateway::new(FetchTransport, &backend_url)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let page = Page::bind(document);
    let source = DomSelectionSource::new(page.text_container().cloned());
    let app = Rc::new(App {
        controller: RefCell::new(Controller::new(config, source, backend_url.clone())),
        gateway,
        page,
    });

    app.page.show_backend_url(&backend_url);
    bind_events(&app)?;
    app.render();
    app.send(Message::Ping);

    APP.with(|slot| *slot.borrow_mut() = Some(app));
    Ok(())
}

/// Attach `handler` to `event` on element `id`, if present.
fn listen<F>(app: &Rc<App>, id: &str, event: &str, handler: F) -> Result<(), JsValue>
where
    F: Fn(&Rc<App>, Event) + 'static,
{
    let Some(target) = element(app.page.document(), id) else {
        return Ok(());
    };
    let app = Rc::clone(app);
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| handler(&app, event));
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget(); // Leak the closure to keep it alive
    Ok(())
}

/// Nearest ancestor of the event target matching `selector`.
fn closest(event: &Event, selector: &str) -> Option<Element> {
    event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()?
}

fn bind_events(app: &Rc<App>) -> Result<(), JsValue> {
    listen(app, ids::SET_BACKEND, "click", |app, _| {
        let url = input_value(app.page.document(), ids::BACKEND_URL);
        app.send(Message::SetBackendUrl(url));
    })?;

    listen(app, ids::SET_DIR, "click", |app, _| {
        let document = app.page.document();
        app.send(Message::SetDirectory {
            path: input_value(document, ids::DIR_PATH),
            output_path: Some(input_value(document, ids::OUT_DIR_PATH)),
        });
    })?;

    listen(app, ids::TEXT_CONTAINER, "mouseup", |app, _| {
        app.send(Message::PointerReleased);
    })?;

    // Label buttons are regenerated on every render, so listen on the parent.
    listen(app, ids::LABELS, "click", |app, event| {
        let label = closest(&event, ".label-btn").and_then(|b| b.get_attribute("data-label"));
        if let Some(label) = label {
            app.send(Message::SelectLabel(Label::new(label)));
        }
    })?;

    listen(app, ids::ANNOTATIONS, "click", |app, event| {
        let index = closest(&event, "button[data-index]")
            .and_then(|b| b.get_attribute("data-index"))
            .and_then(|i| i.parse::<usize>().ok());
        if let Some(index) = index {
            app.send(Message::RemoveAnnotation(index));
        }
    })?;

    listen(app, ids::SAVE_SELECTION, "click", |app, _| {
        app.send(Message::SaveSelection);
    })?;

    listen(app, ids::EXPORT_BTN, "click", |app, _| {
        app.send(Message::Export);
    })?;

    listen(app, ids::UPLOAD_FORM, "submit", |app, event| {
        event.prevent_default();
        let document = app.page.document();
        let file = element_as::<HtmlInputElement>(document, ids::FILE_INPUT)
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        let Some(file) = file else {
            let text = textarea_value(document, ids::TEXT_INPUT);
            app.send(Message::Upload(UploadPayload::Text(text)));
            return;
        };

        let app = Rc::clone(app);
        wasm_bindgen_futures::spawn_local(async move {
            let name = file.name();
            match JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => {
                    let bytes = Uint8Array::new(&buffer).to_vec();
                    log::info!("Read {name}: {} bytes", bytes.len());
                    app.send(Message::Upload(UploadPayload::File { name, bytes }));
                }
                Err(err) => {
                    log::error!("Reading {name} failed: {err:?}");
                    app.page.alert(&format!("Could not read {name}"));
                }
            }
        });
    })?;

    Ok(())
}
