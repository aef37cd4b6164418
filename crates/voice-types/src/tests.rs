#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::error::*;
    use crate::event::*;
    use crate::message::*;
    use crate::session::*;
    use crate::tool::*;
    use serde_json::{json, Value};

    // ─── Message Tests ───────────────────────────────────────

    #[test]
    fn test_message_from_update_defaults() {
        let msg = Message::from_update(MessageUpdate::new("r1"));
        assert_eq!(msg.id, "r1");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "");
        assert_eq!(msg.status, MessageStatus::Streaming);
        assert!(msg.tool_name.is_none());
    }

    #[test]
    fn test_message_apply_keeps_absent_fields() {
        let mut msg = Message::from_update(
            MessageUpdate::new("tool_c1")
                .role(Role::Tool)
                .content("Calling get_current_time…")
                .tool_name("get_current_time"),
        );
        msg.apply(MessageUpdate::new("tool_c1").status(MessageStatus::Complete));

        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.content, "Calling get_current_time…");
        assert_eq!(msg.status, MessageStatus::Complete);
        assert_eq!(msg.tool_name.as_deref(), Some("get_current_time"));
    }

    #[test]
    fn test_message_apply_overwrites_present_fields() {
        let mut msg = Message::from_update(MessageUpdate::new("r1").content("Hel"));
        msg.apply(MessageUpdate::new("r1").content("Hello").role(Role::User));
        assert_eq!(msg.content, "Hello");
        assert_eq!(msg.role, Role::User);
        assert!(msg.is_streaming());
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let msg = Message::from_update(
            MessageUpdate::new("tool_c1").role(Role::Tool).tool_name("get_weather_forecast"),
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["status"], "streaming");
        assert_eq!(json["toolName"], "get_weather_forecast");
    }

    #[test]
    fn test_message_without_tool_name_omits_field() {
        let msg = Message::from_update(MessageUpdate::new("r1"));
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("toolName").is_none());
    }

    // ─── ServerEvent Tests ───────────────────────────────────

    #[test]
    fn test_server_event_text_delta() {
        let event = ServerEvent::parse(
            r#"{"type":"response.output_text.delta","response_id":"r1","delta":"Hel"}"#,
        )
        .unwrap();
        assert_eq!(event.response_id(), Some("r1"));
        match event {
            ServerEvent::OutputTextDelta { delta, .. } => assert_eq!(delta.as_deref(), Some("Hel")),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_response_id_falls_back_to_nested() {
        let event = ServerEvent::parse(
            r#"{"type":"response.completed","response":{"id":"r9","status":"completed"}}"#,
        )
        .unwrap();
        assert_eq!(event.response_id(), Some("r9"));
    }

    #[test]
    fn test_server_event_missing_fields_are_none() {
        let event = ServerEvent::parse(r#"{"type":"response.output_text.delta"}"#).unwrap();
        assert_eq!(event.response_id(), None);
    }

    #[test]
    fn test_server_event_output_item_added() {
        let event = ServerEvent::parse(
            r#"{"type":"response.output_item.added","response_id":"r1",
                "item":{"type":"function_call","id":"item_1","call_id":"c1","name":"get_current_time"}}"#,
        )
        .unwrap();
        match event {
            ServerEvent::OutputItemAdded { response_id, item: Some(item) } => {
                assert_eq!(response_id.as_deref(), Some("r1"));
                assert!(item.is_function_call());
                assert_eq!(item.call_id.as_deref(), Some("c1"));
                assert_eq!(item.name.as_deref(), Some("get_current_time"));
                assert_eq!(item.id.as_deref(), Some("item_1"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_unknown_type() {
        let event = ServerEvent::parse(r#"{"type":"session.created","session":{}}"#).unwrap();
        assert_eq!(event, ServerEvent::Other);
    }

    #[test]
    fn test_server_event_invalid_json() {
        let result = ServerEvent::parse("{not json");
        assert!(matches!(result, Err(AgentError::Serialization(_))));
    }

    #[test]
    fn test_server_event_missing_type() {
        assert!(ServerEvent::parse(r#"{"delta":"x"}"#).is_err());
    }

    #[test]
    fn test_server_event_error() {
        let event =
            ServerEvent::parse(r#"{"type":"response.error","error":{"message":"rate limited"}}"#)
                .unwrap();
        match event {
            ServerEvent::ResponseError { error: Some(detail) } => {
                assert_eq!(detail.message.as_deref(), Some("rate limited"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    // ─── ClientEvent Tests ───────────────────────────────────

    #[test]
    fn test_client_event_user_text_shape() {
        let event = ClientEvent::user_text("msg_1", "hello");
        let json: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "conversation.item.create",
                "item": {
                    "type": "message",
                    "id": "msg_1",
                    "role": "user",
                    "content": [{"type": "input_text", "text": "hello"}]
                }
            })
        );
    }

    #[test]
    fn test_client_event_response_create_shape() {
        let json = ClientEvent::ResponseCreate.to_json().unwrap();
        assert_eq!(json, r#"{"type":"response.create"}"#);
    }

    #[test]
    fn test_client_event_function_call_output_shape() {
        let event = ClientEvent::function_call_output("c1", r#"{"content":"ok","data":{}}"#);
        let json: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["item"]["type"], "function_call_output");
        assert_eq!(json["item"]["call_id"], "c1");
        assert_eq!(json["item"]["output"], r#"{"content":"ok","data":{}}"#);
    }

    #[test]
    fn test_session_event_serialization() {
        let event = SessionEvent::RoundTripChanged { round_trip_ms: Some(42) };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, json!({"kind": "roundTripChanged", "roundTripMs": 42}));

        let event = SessionEvent::StatusChanged { status: SessionStatus::Connecting };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, json!({"kind": "statusChanged", "status": "connecting"}));
    }

    // ─── Tool Tests ──────────────────────────────────────────

    #[test]
    fn test_pending_tool_call_new() {
        let call = PendingToolCall::new("c1", "get_current_time", "r1", "item_1");
        assert_eq!(call.message_id, "tool_c1");
        assert_eq!(call.status, ToolCallStatus::Collecting);
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_tool_call_status_terminal() {
        assert!(!ToolCallStatus::Collecting.is_terminal());
        assert!(!ToolCallStatus::Executing.is_terminal());
        assert!(ToolCallStatus::Completed.is_terminal());
        assert!(ToolCallStatus::Failed.is_terminal());
    }

    #[test]
    fn test_tool_result_payload_success() {
        let mut data = serde_json::Map::new();
        data.insert("iso".to_string(), json!("2024-01-01T00:00:00Z"));
        let payload = ToolResultPayload::Success {
            content: "Current time is 2024-01-01T00:00:00Z".to_string(),
            data,
        };
        let json: Value = serde_json::from_str(&payload.encode()).unwrap();
        assert_eq!(json["content"], "Current time is 2024-01-01T00:00:00Z");
        assert_eq!(json["data"]["iso"], "2024-01-01T00:00:00Z");
        assert!(!payload.is_error());
    }

    #[test]
    fn test_tool_result_payload_failure() {
        let payload = ToolResultPayload::Failure { message: "boom".to_string() };
        assert_eq!(payload.to_value(), json!({"error": true, "message": "boom"}));
        assert!(payload.is_error());
    }

    #[test]
    fn test_tool_output_deserialize_partial() {
        let output: ToolOutput = serde_json::from_str(r#"{"content":"done"}"#).unwrap();
        assert_eq!(output.content.as_deref(), Some("done"));
        assert!(output.data.is_none());
    }

    // ─── Session Tests ───────────────────────────────────────

    #[test]
    fn test_session_credential_deserialize() {
        let cred: SessionCredential = serde_json::from_str(
            r#"{"id":"sess_1","client_secret":{"value":"ek_123","expires_at":0},"model":"gpt-4o-realtime-preview"}"#,
        )
        .unwrap();
        assert_eq!(cred.client_secret.value, "ek_123");
        assert_eq!(cred.model, "gpt-4o-realtime-preview");
    }

    #[test]
    fn test_session_request_from_config() {
        let config = RealtimeConfig::default();
        let request = SessionRequest::new(&config, Vec::new());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-realtime-preview");
        assert_eq!(json["voice"], "verse");
        assert_eq!(json["modalities"], json!(["text", "audio"]));
        assert_eq!(json["tool_choice"], "auto");
        assert_eq!(json["input_audio_transcription"]["model"], "gpt-4o-mini-transcribe");
        assert!(json["instructions"].as_str().unwrap().starts_with("You are Lumi"));
    }

    #[test]
    fn test_session_request_without_transcription() {
        let config = RealtimeConfig {
            transcription_model: None,
            ..RealtimeConfig::default()
        };
        let json = serde_json::to_value(SessionRequest::new(&config, Vec::new())).unwrap();
        assert!(json.get("input_audio_transcription").is_none());
    }

    #[test]
    fn test_session_status_labels() {
        assert_eq!(SessionStatus::Idle.label(), "Idle");
        assert_eq!(SessionStatus::Connected.label(), "Connected");
        assert_eq!(SessionStatus::Connecting.as_str(), "connecting");
    }

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.realtime.model, "gpt-4o-realtime-preview");
        assert_eq!(config.realtime.voice, "verse");
        assert_eq!(config.realtime.data_channel_label, "oai-events");
        assert_eq!(config.endpoints.session, "/api/realtime/session");
        assert!(config.endpoints.tools.is_none());
        assert_eq!(config.telemetry.rtt_interval_ms, 2000);
        assert_eq!(config.telemetry.analyser_fft_size, 512);
        assert!(config.realtime.instructions.starts_with("You are Lumi"));
    }

    #[test]
    fn test_config_partial_json() {
        let config = AgentConfig::from_json(
            r#"{"endpoints":{"tools":"/api/tools/run"},"telemetry":{"rtt_interval_ms":500}}"#,
        )
        .unwrap();
        assert_eq!(config.endpoints.tools.as_deref(), Some("/api/tools/run"));
        assert_eq!(config.endpoints.session, "/api/realtime/session");
        assert_eq!(config.telemetry.rtt_interval_ms, 500);
        assert_eq!(config.telemetry.analyser_fft_size, 512);
        assert_eq!(config.realtime.voice, "verse");
    }

    #[test]
    fn test_config_invalid_json() {
        let result = AgentConfig::from_json("[1, 2");
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    // ─── Error Tests ─────────────────────────────────────────

    #[test]
    fn test_error_display() {
        assert_eq!(
            AgentError::ChannelNotReady.to_string(),
            "Realtime channel is not ready yet."
        );
        assert_eq!(
            AgentError::MalformedArguments("EOF".to_string()).to_string(),
            "Malformed tool arguments: EOF"
        );
        assert_eq!(AgentError::Tool("Unhandled tool: x".to_string()).to_string(), "Unhandled tool: x");
    }

    #[test]
    fn test_error_user_message() {
        let err = AgentError::Credential("Unable to create realtime session".to_string());
        assert_eq!(err.user_message(), "Unable to create realtime session");
        let err = AgentError::Transport("Failed to negotiate realtime session".to_string());
        assert_eq!(err.user_message(), "Failed to negotiate realtime session");
        assert_eq!(AgentError::ChannelNotReady.user_message(), "Realtime channel is not ready yet.");
        assert_eq!(
            AgentError::Network("offline".to_string()).user_message(),
            "Network error: offline"
        );
    }

    #[test]
    fn test_error_from_serde() {
        let err: AgentError = serde_json::from_str::<Value>("{").unwrap_err().into();
        assert!(matches!(err, AgentError::Serialization(_)));
    }
}
