//! WASM-target tests for voice-types.
//!
//! Runs the serde shapes that cross the JS boundary under
//! wasm32-unknown-unknown via `wasm-pack test --node`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use voice_types::config::AgentConfig;
use voice_types::event::{ClientEvent, ServerEvent};
use voice_types::message::{Message, MessageUpdate, Role};

#[wasm_bindgen_test]
fn server_event_parses_delta() {
    let event = ServerEvent::parse(
        r#"{"type":"response.output_text.delta","response_id":"r1","delta":"Hi"}"#,
    )
    .unwrap();
    assert_eq!(event.response_id(), Some("r1"));
}

#[wasm_bindgen_test]
fn server_event_unknown_kind() {
    let event = ServerEvent::parse(r#"{"type":"rate_limits.updated"}"#).unwrap();
    assert_eq!(event, ServerEvent::Other);
}

#[wasm_bindgen_test]
fn client_event_response_create() {
    assert_eq!(
        ClientEvent::ResponseCreate.to_json().unwrap(),
        r#"{"type":"response.create"}"#
    );
}

#[wasm_bindgen_test]
fn message_update_merges() {
    let mut msg = Message::from_update(MessageUpdate::new("m1").role(Role::User).content("a"));
    msg.apply(MessageUpdate::new("m1").content("ab"));
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.content, "ab");
}

#[wasm_bindgen_test]
fn config_defaults_roundtrip() {
    let json = serde_json::to_string(&AgentConfig::default()).unwrap();
    let config = AgentConfig::from_json(&json).unwrap();
    assert_eq!(config.telemetry.rtt_interval_ms, 2000);
}
