//! WASM-target tests for the exported `VoiceAgent` handle.
#![cfg(target_arch = "wasm32")]

use serde_json::Value;
use wasm_bindgen_test::*;

use voice_app::VoiceAgent;

#[wasm_bindgen_test]
fn agent_starts_idle() {
    let agent = VoiceAgent::new(None).unwrap();
    assert_eq!(agent.status(), "idle");
    assert_eq!(agent.last_error(), None);
    assert_eq!(agent.input_level(), 0.0);
    assert_eq!(agent.round_trip_ms(), None);
    assert_eq!(agent.transcript().unwrap(), "[]");
}

#[wasm_bindgen_test]
fn agent_accepts_partial_config() {
    let agent = VoiceAgent::new(Some(r#"{"endpoints":{"tools":"/api/tools/run"}}"#.to_string()));
    assert!(agent.is_ok());
    assert!(VoiceAgent::new(Some("{oops".to_string())).is_err());
}

#[wasm_bindgen_test]
fn agent_exports_tool_definitions() {
    let agent = VoiceAgent::new(None).unwrap();
    let defs: Value = serde_json::from_str(&agent.tool_definitions().unwrap()).unwrap();
    let names: Vec<&str> = defs
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["get_current_time", "get_weather_forecast"]);
}

#[wasm_bindgen_test]
fn agent_rejects_text_before_connecting() {
    let agent = VoiceAgent::new(None).unwrap();
    assert!(agent.send_text("hello").is_err());
    assert_eq!(agent.last_error().as_deref(), Some("Realtime channel is not ready yet."));

    let events: Value = serde_json::from_str(&agent.drain_events().unwrap()).unwrap();
    assert_eq!(events[0]["kind"], "errorChanged");
    assert_eq!(agent.transcript().unwrap(), "[]");
}
