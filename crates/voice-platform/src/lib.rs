//! Browser adapters for the voice-core ports.

pub mod credentials;
pub mod tools;
pub mod transport;
pub mod timer;

use wasm_bindgen::JsValue;
use voice_types::AgentError;

/// Map a thrown JS value into an interop error
pub(crate) fn js_err(context: &str, value: JsValue) -> AgentError {
    let detail = value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value));
    AgentError::JsInterop(format!("{}: {}", context, detail))
}
