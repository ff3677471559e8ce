//! In-memory transport for tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::GatewayError;
use super::transport::{HttpRequest, HttpResponse, Transport};

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<HttpResponse, String>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn respond(&self, response: HttpResponse) {
        self.replies.borrow_mut().push_back(Ok(response));
    }

    /// Queue a JSON response with status 200.
    pub fn respond_json(&self, body: serde_json::Value) {
        self.respond(HttpResponse::new(200, body.to_string()));
    }

    /// Queue a network failure.
    pub fn fail(&self, message: &str) {
        self.replies.borrow_mut().push_back(Err(message.to_string()));
    }

    /// Requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// URLs of requests sent so far, without the base.
    pub fn paths(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|r| {
                let url = r.url.as_str();
                let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
                after_scheme
                    .find('/')
                    .map_or_else(String::new, |i| after_scheme[i..].to_string())
            })
            .collect()
    }

    /// Number of queued replies not consumed yet.
    pub fn pending(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        log::trace!("{} {}", request.method.as_str(), request.url);
        self.requests.borrow_mut().push(request);
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(GatewayError::transport(message)),
            None => Err(GatewayError::transport("no scripted response")),
        }
    }
}
