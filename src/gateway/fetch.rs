//! `window.fetch` transport for the browser build.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, FormData, Request, RequestInit, RequestMode, Response};

use super::GatewayError;
use super::transport::{FormField, FormValue, HttpRequest, HttpResponse, RequestBody, Transport};

/// Sends requests with the browser's Fetch API in CORS mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

fn js_error(err: JsValue) -> GatewayError {
    GatewayError::transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn build_form(fields: &[FormField]) -> Result<FormData, GatewayError> {
    let form = FormData::new().map_err(js_error)?;
    for field in fields {
        match &field.value {
            FormValue::Text(text) => form.append_with_str(&field.name, text).map_err(js_error)?,
            FormValue::File { file_name, bytes } => {
                let parts = Array::of1(&Uint8Array::from(bytes.as_slice()));
                let blob = Blob::new_with_u8_array_sequence(&parts).map_err(js_error)?;
                form.append_with_blob_and_filename(&field.name, &blob, file_name)
                    .map_err(js_error)?;
            }
        }
    }
    Ok(form)
}

impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        let window = web_sys::window().ok_or_else(|| GatewayError::transport("No window"))?;

        let init = RequestInit::new();
        init.set_method(request.method.as_str());
        init.set_mode(RequestMode::Cors);
        let mut content_type = None;
        match &request.body {
            RequestBody::Empty => {}
            RequestBody::Json(json) => {
                init.set_body(&JsValue::from_str(json));
                content_type = Some("application/json");
            }
            // The browser sets the multipart boundary itself.
            RequestBody::Form(fields) => init.set_body(&build_form(fields)?),
        }

        let js_request = Request::new_with_str_and_init(&request.url, &init).map_err(js_error)?;
        if let Some(content_type) = content_type {
            js_request
                .headers()
                .set("Content-Type", content_type)
                .map_err(js_error)?;
        }

        log::debug!("{} {}", request.method.as_str(), request.url);
        let value = JsFuture::from(window.fetch_with_request(&js_request))
            .await
            .map_err(js_error)?;
        let response: Response = value.dyn_into().map_err(js_error)?;
        let buffer = JsFuture::from(response.array_buffer().map_err(js_error)?)
            .await
            .map_err(js_error)?;

        Ok(HttpResponse::new(
            response.status(),
            Uint8Array::new(&buffer).to_vec(),
        ))
    }
}
