//! Transform channel to the background worker, over chrome.runtime
//! messaging. Delivery failures are reported as connection-level errors,
//! distinct from errors the transformer itself reports in its reply.

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use mellow_protocol::RewriteRequest;

use crate::error::ContentError;
use crate::rewrite::{RewriteOutcome, Transformer};

pub struct BackgroundChannel;

#[async_trait(?Send)]
impl Transformer for BackgroundChannel {
    async fn transform(&self, request: &RewriteRequest) -> RewriteOutcome {
        match round_trip(request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("transform channel failed: {err}");
                RewriteOutcome::Failure(err.to_string())
            }
        }
    }
}

async fn round_trip(request: &RewriteRequest) -> Result<RewriteOutcome, ContentError> {
    let payload = encode_request(request).map_err(connection_error)?;
    let promise = runtime_send_message(&payload).map_err(connection_error)?;
    let reply = JsFuture::from(promise).await.map_err(connection_error)?;
    Ok(decode_reply(&reply))
}

fn encode_request(request: &RewriteRequest) -> Result<JsValue, JsValue> {
    let message = Object::new();
    Reflect::set(
        &message,
        &JsValue::from_str("action"),
        &JsValue::from_str(&request.action),
    )?;
    Reflect::set(
        &message,
        &JsValue::from_str("text"),
        &JsValue::from_str(&request.text),
    )?;
    Reflect::set(
        &message,
        &JsValue::from_str("context"),
        &JsValue::from_str(&request.context),
    )?;
    Ok(message.into())
}

fn decode_reply(reply: &JsValue) -> RewriteOutcome {
    if let Some(error) = string_field(reply, "error") {
        return RewriteOutcome::Failure(error);
    }
    if let Some(suggested) = string_field(reply, "suggestedText") {
        return RewriteOutcome::SuggestedText(suggested);
    }
    RewriteOutcome::Failure(ContentError::MalformedReply.to_string())
}

fn string_field(value: &JsValue, key: &str) -> Option<String> {
    Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .and_then(|field| field.as_string())
        .filter(|field| !field.is_empty())
}

fn runtime_send_message(payload: &JsValue) -> Result<Promise, JsValue> {
    let chrome = Reflect::get(&js_sys::global(), &JsValue::from_str("chrome"))?;
    let runtime = Reflect::get(&chrome, &JsValue::from_str("runtime"))?;
    let send_message: Function =
        Reflect::get(&runtime, &JsValue::from_str("sendMessage"))?.dyn_into()?;
    send_message
        .call1(&runtime, payload)?
        .dyn_into::<Promise>()
        .map_err(|_| JsValue::from_str("sendMessage did not return a promise"))
}

fn connection_error(err: JsValue) -> ContentError {
    ContentError::Connection(describe_js_error(&err))
}

fn describe_js_error(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string()
        .unwrap_or_else(|| "message channel unavailable".to_string())
}
