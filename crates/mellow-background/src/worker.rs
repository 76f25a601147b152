//! chrome.* glue for the service-worker context: the runtime message
//! listener and the settings read from chrome.storage.local.

use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use mellow_protocol::{
    RewriteError, RewriteRequest, RewriteResponse, Settings, STORAGE_KEY_API_KEY,
    STORAGE_KEY_PROVIDER,
};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = tracing_wasm::try_set_as_global_default();

    register_message_listener()?;
    tracing::info!("mellow background worker listening");
    Ok(())
}

fn register_message_listener() -> Result<(), JsValue> {
    let on_message = chrome_path(&["chrome", "runtime", "onMessage"])?;
    let add_listener: Function =
        Reflect::get(&on_message, &JsValue::from_str("addListener"))?.dyn_into()?;
    let listener =
        Closure::<dyn FnMut(JsValue, JsValue, Function) -> JsValue>::new(handle_message);
    add_listener.call1(&on_message, listener.as_ref())?;
    // The listener lives for the worker lifetime.
    listener.forget();
    Ok(())
}

fn handle_message(message: JsValue, _sender: JsValue, send_response: Function) -> JsValue {
    let Some(request) = decode_request(&message) else {
        return JsValue::FALSE;
    };

    wasm_bindgen_futures::spawn_local(async move {
        let reply = match rewrite(&request).await {
            Ok(suggestion) => RewriteResponse::Success {
                suggested_text: suggestion,
            },
            Err(err) => {
                tracing::warn!("rewrite attempt failed: {err}");
                RewriteResponse::Failure {
                    error: err.to_string(),
                }
            }
        };
        let reply = encode_reply(&reply).unwrap_or(JsValue::NULL);
        if let Err(err) = send_response.call1(&JsValue::NULL, &reply) {
            tracing::warn!("failed to deliver reply to content script: {err:?}");
        }
    });

    // True keeps the message channel open for the asynchronous reply.
    JsValue::TRUE
}

async fn rewrite(request: &RewriteRequest) -> Result<String, RewriteError> {
    let (provider, api_key) = match stored_settings().await {
        Ok(pair) => pair,
        Err(err) => {
            tracing::warn!("settings read failed, treating as unconfigured: {err:?}");
            (None, None)
        }
    };
    let settings = Settings::from_stored(provider.as_deref(), api_key.as_deref())?;
    crate::handle_rewrite(request, &settings).await
}

async fn stored_settings() -> Result<(Option<String>, Option<String>), JsValue> {
    let storage = chrome_path(&["chrome", "storage", "local"])?;
    let get: Function = Reflect::get(&storage, &JsValue::from_str("get"))?.dyn_into()?;
    let keys = Array::of2(
        &JsValue::from_str(STORAGE_KEY_PROVIDER),
        &JsValue::from_str(STORAGE_KEY_API_KEY),
    );
    let promise: Promise = get.call1(&storage, &keys)?.dyn_into()?;
    let snapshot = JsFuture::from(promise).await?;
    Ok((
        string_field(&snapshot, STORAGE_KEY_PROVIDER),
        string_field(&snapshot, STORAGE_KEY_API_KEY),
    ))
}

fn decode_request(message: &JsValue) -> Option<RewriteRequest> {
    let action = string_field(message, "action")?;
    let request = RewriteRequest {
        action,
        text: string_field(message, "text").unwrap_or_default(),
        context: string_field(message, "context").unwrap_or_default(),
    };
    request.is_rewrite().then_some(request)
}

fn encode_reply(reply: &RewriteResponse) -> Result<JsValue, JsValue> {
    let json =
        serde_json::to_string(reply).map_err(|err| JsValue::from_str(&err.to_string()))?;
    js_sys::JSON::parse(&json)
}

fn string_field(value: &JsValue, key: &str) -> Option<String> {
    Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .and_then(|field| field.as_string())
}

fn chrome_path(segments: &[&str]) -> Result<JsValue, JsValue> {
    let mut current: JsValue = js_sys::global().into();
    for segment in segments {
        current = Reflect::get(&current, &JsValue::from_str(segment))?;
        if current.is_undefined() || current.is_null() {
            return Err(JsValue::from_str(&format!(
                "chrome API path missing: {segment}"
            )));
        }
    }
    Ok(current)
}
