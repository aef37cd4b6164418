//! WASM-target tests for voice-core.
//!
//! Runs the synchronous core pieces under wasm32-unknown-unknown via
//! `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use serde_json::json;
use voice_core::event_bus::EventBus;
use voice_core::processor::{Dispatch, EventProcessor};
use voice_core::state::SessionState;
use voice_core::telemetry::{best_round_trip_ms, rms, smooth_level};
use voice_core::tools::{current_time, parse_tool_args, ToolRegistry, GET_CURRENT_TIME};
use voice_types::event::SessionEvent;
use voice_types::message::MessageStatus;
use voice_types::session::CandidatePairStats;

#[wasm_bindgen_test]
fn event_bus_emit_and_drain() {
    let bus = EventBus::new();
    bus.emit(SessionEvent::TranscriptCleared);
    assert!(bus.has_pending());
    assert_eq!(bus.drain().len(), 1);
    assert!(!bus.has_pending());
}

#[wasm_bindgen_test]
fn tool_registry_has_builtins() {
    let registry = ToolRegistry::new();
    assert_eq!(registry.definitions().len(), 2);
    assert!(registry.contains(GET_CURRENT_TIME));
}

#[wasm_bindgen_test]
fn parse_tool_args_empty_is_object() {
    assert_eq!(parse_tool_args("").unwrap(), json!({}));
    assert!(parse_tool_args("{bad").is_err());
}

#[wasm_bindgen_test]
fn current_time_uses_browser_clock() {
    let output = current_time();
    assert!(output.content.unwrap().starts_with("Current time is "));
}

#[wasm_bindgen_test]
fn processor_streams_text() {
    let mut state = SessionState::new(EventBus::new());
    for delta in ["Hel", "lo"] {
        let frame = json!({"type": "response.output_text.delta", "response_id": "r1", "delta": delta});
        assert_eq!(EventProcessor::handle_frame(&mut state, &frame.to_string()), Dispatch::None);
    }
    EventProcessor::handle_frame(&mut state, r#"{"type":"response.completed","response_id":"r1"}"#);

    let msg = state.transcript.get("r1").unwrap();
    assert_eq!(msg.content, "Hello");
    assert_eq!(msg.status, MessageStatus::Complete);
}

#[wasm_bindgen_test]
fn telemetry_math() {
    assert_eq!(rms(&[0.0; 16]), 0.0);
    assert!(smooth_level(0.5, 0.0) < 0.5);
    let pairs = [CandidatePairStats { succeeded: true, current_round_trip_time: Some(0.012) }];
    assert_eq!(best_round_trip_ms(&pairs), Some(12));
}
