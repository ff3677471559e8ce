//! Async driver connecting the controller to the backend gateway.
//!
//! The controller is only borrowed for the synchronous `update` step; no
//! borrow is held across an `.await`, so several dispatches may interleave on
//! a single-threaded executor.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::gateway::{BackendGateway, Transport};
use crate::offset::SelectionSource;

use super::{Command, Controller, Effect, Message};

/// Run one network command and wrap its result as a message.
pub async fn execute<T: Transport>(gateway: &BackendGateway<T>, command: Command) -> Message {
    match command {
        Command::CheckBackend => Message::BackendChecked(gateway.health_check().await),
        Command::LoadDirectory { path, output_path } => Message::DirectoryLoaded(
            gateway
                .load_directory(&path, output_path.as_deref())
                .await,
        ),
        Command::Upload(payload) => Message::Uploaded(gateway.upload(&payload).await),
        Command::FetchText(doc_id) => {
            let result = gateway.fetch_text(&doc_id).await;
            Message::TextFetched { doc_id, result }
        }
        Command::PushAnnotations(job) => {
            let result = gateway
                .push_annotations(&job.doc_id, &job.annotations)
                .await;
            Message::AnnotationsPushed {
                doc_id: job.doc_id,
                result,
            }
        }
        Command::Export(doc_id) => {
            let result = gateway.export(&doc_id).await;
            Message::Exported { doc_id, result }
        }
        Command::Advance(prev_doc_id) => {
            let result = gateway.advance(&prev_doc_id).await;
            Message::Advanced {
                prev_doc_id,
                result,
            }
        }
    }
}

/// Handle `message` and every follow-up result, passing effects to
/// `on_effect` as soon as they are produced.
///
/// `Effect::BackendUrlChanged` is applied to the gateway before it is passed
/// on, so commands from the same step already use the new URL.
pub async fn dispatch_with<S, T, F>(
    controller: &RefCell<Controller<S>>,
    gateway: &BackendGateway<T>,
    message: Message,
    mut on_effect: F,
) where
    S: SelectionSource,
    T: Transport,
    F: FnMut(Effect),
{
    let mut inbox = VecDeque::from([message]);
    while let Some(message) = inbox.pop_front() {
        let update = controller.borrow_mut().update(message);
        for effect in update.effects {
            if let Effect::BackendUrlChanged(url) = &effect {
                if let Err(err) = gateway.set_base_url(url) {
                    log::error!("{err}");
                }
            }
            on_effect(effect);
        }
        for command in update.commands {
            log::trace!("Executing {command:?}");
            inbox.push_back(execute(gateway, command).await);
        }
    }
}

/// Handle `message` and every follow-up result, returning all effects in order.
pub async fn dispatch<S, T>(
    controller: &RefCell<Controller<S>>,
    gateway: &BackendGateway<T>,
    message: Message,
) -> Vec<Effect>
where
    S: SelectionSource,
    T: Transport,
{
    let mut effects = Vec::new();
    dispatch_with(controller, gateway, message, |effect| effects.push(effect)).await;
    effects
}
