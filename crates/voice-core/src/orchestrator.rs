//! Tool orchestrator. Runs a finalized tool call and reports the outcome.
//!
//! Every call that begins execution produces exactly one result event
//! followed by a `response.create`, whether the tool succeeded or not.

use std::cell::RefCell;
use std::rc::Rc;

use voice_types::{
    AgentError, Result,
    event::ClientEvent,
    message::{MessageStatus, MessageUpdate, Role},
    tool::{PendingToolCall, ToolCallStatus, ToolOutput, ToolResultPayload},
};

use crate::ports::ToolExecutorPort;
use crate::state::SessionState;
use crate::tools::parse_tool_args;

pub struct ToolOrchestrator {
    executor: Rc<dyn ToolExecutorPort>,
}

impl ToolOrchestrator {
    pub fn new(executor: Rc<dyn ToolExecutorPort>) -> Self {
        Self { executor }
    }

    /// Execute a call whose arguments are final.
    ///
    /// Returns the terminal status, or `None` if the call was not eligible
    /// or the session was reset while the tool ran.
    pub async fn execute(&self, state: &RefCell<SessionState>, call_id: &str) -> Option<ToolCallStatus> {
        let (call, epoch) = {
            let mut state = state.borrow_mut();
            let Some(call) = state.tool_calls.begin_execution(call_id) else {
                log::debug!("Tool call {} is not ready to execute", call_id);
                return None;
            };
            state.upsert(
                MessageUpdate::new(call.message_id.clone())
                    .role(Role::Tool)
                    .content(format!("Running {}…", call.tool_name))
                    .status(MessageStatus::Streaming)
                    .tool_name(call.tool_name.clone()),
            );
            (call, state.epoch)
        };

        log::info!("Executing tool {} ({})", call.tool_name, call.call_id);
        let outcome = match parse_tool_args(&call.arguments) {
            Ok(args) => self.executor.execute(&call.tool_name, args).await,
            Err(e) => Err(AgentError::MalformedArguments(e.to_string())),
        };

        let mut state = state.borrow_mut();
        if state.epoch != epoch {
            log::debug!("Discarding result of {}: session was reset", call.call_id);
            return None;
        }
        Some(Self::deliver(&mut state, &call, outcome))
    }

    fn deliver(state: &mut SessionState, call: &PendingToolCall, outcome: Result<ToolOutput>) -> ToolCallStatus {
        let (caption, payload, status) = match outcome {
            Ok(output) => {
                let caption = output
                    .content
                    .clone()
                    .unwrap_or_else(|| format!("Tool {} executed successfully.", call.tool_name));
                let payload = ToolResultPayload::Success {
                    content: caption.clone(),
                    data: output.data.unwrap_or_default(),
                };
                (caption, payload, ToolCallStatus::Completed)
            }
            Err(e) => {
                log::warn!("Tool {} failed: {}", call.tool_name, e);
                let caption = format!("Tool {} failed: {}", call.tool_name, e);
                let payload = ToolResultPayload::Failure { message: e.to_string() };
                (caption, payload, ToolCallStatus::Failed)
            }
        };

        state.upsert(
            MessageUpdate::new(call.message_id.clone())
                .role(Role::Tool)
                .content(caption)
                .status(MessageStatus::Complete)
                .tool_name(call.tool_name.clone()),
        );

        let result = ClientEvent::function_call_output(call.call_id.clone(), payload.encode());
        if let Err(e) = state.send(&result) {
            log::warn!("Could not deliver result of {}: {}", call.call_id, e);
        }
        if let Err(e) = state.send(&ClientEvent::ResponseCreate) {
            log::warn!("Could not request continuation after {}: {}", call.call_id, e);
        }

        state.tool_calls.finish(&call.call_id, status);
        status
    }
}
