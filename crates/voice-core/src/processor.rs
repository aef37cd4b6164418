//! Event processor. Applies inbound realtime events to the session state.
//!
//! Each event is handled to completion before the next one. Partial or
//! malformed frames are expected while streaming and are dropped quietly;
//! nothing here can tear the session down.

use voice_types::{
    event::{OutputItem, ServerEvent},
    message::{MessageStatus, MessageUpdate, Role},
    tool::PendingToolCall,
};

use crate::state::SessionState;

/// Follow-up work the caller must schedule after an event was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    None,
    /// Arguments are final; hand the call to the tool orchestrator
    ExecuteTool(String),
}

pub struct EventProcessor;

impl EventProcessor {
    /// Decode one text frame and apply it.
    pub fn handle_frame(state: &mut SessionState, frame: &str) -> Dispatch {
        match ServerEvent::parse(frame) {
            Ok(event) => Self::handle(state, event),
            Err(e) => {
                log::warn!("Unhandled realtime payload: {}", e);
                Dispatch::None
            }
        }
    }

    pub fn handle(state: &mut SessionState, event: ServerEvent) -> Dispatch {
        let response_id = event.response_id().map(str::to_string);

        match event {
            ServerEvent::OutputTextDelta { delta, .. } => {
                let (Some(response_id), Some(delta)) = (response_id, non_empty(delta)) else {
                    log::debug!("Ignoring text delta without response id or delta");
                    return Dispatch::None;
                };
                let text = state.responses.append(&response_id, &delta).to_string();
                state.upsert(
                    MessageUpdate::new(response_id)
                        .role(Role::Assistant)
                        .content(text)
                        .status(MessageStatus::Streaming),
                );
            }

            ServerEvent::ResponseCompleted { .. } => {
                let Some(response_id) = response_id else {
                    log::debug!("Ignoring response.completed without response id");
                    return Dispatch::None;
                };
                let text = state.responses.text(&response_id).unwrap_or_default().to_string();
                state.upsert(
                    MessageUpdate::new(response_id)
                        .role(Role::Assistant)
                        .content(text)
                        .status(MessageStatus::Complete),
                );
            }

            ServerEvent::InputTranscriptionCompleted { item_id, transcript } => {
                if let (Some(item_id), Some(transcript)) = (item_id, non_empty(transcript)) {
                    state.upsert(
                        MessageUpdate::new(item_id)
                            .role(Role::User)
                            .content(transcript)
                            .status(MessageStatus::Complete),
                    );
                }
            }

            ServerEvent::OutputItemAdded { item, .. } => {
                if let (Some(item), Some(response_id)) = (item, response_id) {
                    Self::open_tool_call(state, item, response_id);
                }
            }

            ServerEvent::FunctionCallArgumentsDelta { call_id, delta } => {
                if let (Some(call_id), Some(delta)) = (call_id, non_empty(delta)) {
                    if !state.tool_calls.append_arguments(&call_id, &delta) {
                        log::debug!("Arguments delta for unknown call {}", call_id);
                    }
                }
            }

            ServerEvent::FunctionCallArgumentsDone { call_id, arguments } => {
                let Some(call_id) = call_id else {
                    return Dispatch::None;
                };
                if state.tool_calls.finalize_arguments(&call_id, arguments) {
                    return Dispatch::ExecuteTool(call_id);
                }
                log::debug!("Arguments done for unknown call {}", call_id);
            }

            ServerEvent::ResponseError { error } => {
                let message = error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "Realtime response error".to_string());
                log::warn!("Remote agent reported an error: {}", message);
                state.set_error(Some(message));
            }

            ServerEvent::Other => {}
        }

        Dispatch::None
    }

    fn open_tool_call(state: &mut SessionState, item: OutputItem, response_id: String) {
        if !item.is_function_call() {
            return;
        }
        let (Some(call_id), Some(name)) = (item.call_id, item.name) else {
            log::debug!("Ignoring function call item without call id or name");
            return;
        };
        let item_id = item.id.unwrap_or_else(|| call_id.clone());
        let call = PendingToolCall::new(call_id, name.clone(), response_id, item_id);
        let message_id = call.message_id.clone();

        if state.tool_calls.open(call) {
            state.upsert(
                MessageUpdate::new(message_id)
                    .role(Role::Tool)
                    .content(format!("Calling {}…", name))
                    .status(MessageStatus::Streaming)
                    .tool_name(name),
            );
        }
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}
