//! In-flight tool calls, keyed by call id.
//!
//! Status only moves forward: collecting → executing → completed | failed.
//! Terminal records are removed, so a call id can never execute twice.

use std::collections::HashMap;
use voice_types::tool::{PendingToolCall, ToolCallStatus};

#[derive(Debug, Default)]
pub struct ToolCallRegistry {
    calls: HashMap<String, PendingToolCall>,
}

impl ToolCallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly announced call. A call id that is already tracked is left untouched.
    pub fn open(&mut self, call: PendingToolCall) -> bool {
        if self.calls.contains_key(&call.call_id) {
            log::debug!("Tool call {} announced twice; keeping the first", call.call_id);
            return false;
        }
        self.calls.insert(call.call_id.clone(), call);
        true
    }

    pub fn append_arguments(&mut self, call_id: &str, delta: &str) -> bool {
        match self.collecting_mut(call_id) {
            Some(call) => {
                call.arguments.push_str(delta);
                true
            }
            None => false,
        }
    }

    /// Replace streamed arguments with the authoritative final text, when supplied.
    pub fn finalize_arguments(&mut self, call_id: &str, arguments: Option<String>) -> bool {
        match self.collecting_mut(call_id) {
            Some(call) => {
                if let Some(arguments) = arguments {
                    call.arguments = arguments;
                }
                true
            }
            None => false,
        }
    }

    /// Move a collecting call to executing and return a snapshot of it.
    /// Returns `None` if the call is unknown or already past collecting.
    pub fn begin_execution(&mut self, call_id: &str) -> Option<PendingToolCall> {
        let call = self.collecting_mut(call_id)?;
        call.status = ToolCallStatus::Executing;
        Some(call.clone())
    }

    /// Mark an executing call terminal and drop it from the registry.
    pub fn finish(&mut self, call_id: &str, status: ToolCallStatus) -> Option<PendingToolCall> {
        debug_assert!(status.is_terminal());
        if self.calls.get(call_id)?.status != ToolCallStatus::Executing {
            return None;
        }
        let mut call = self.calls.remove(call_id)?;
        call.status = status;
        Some(call)
    }

    pub fn get(&self, call_id: &str) -> Option<&PendingToolCall> {
        self.calls.get(call_id)
    }

    pub fn contains(&self, call_id: &str) -> bool {
        self.calls.contains_key(call_id)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn collecting_mut(&mut self, call_id: &str) -> Option<&mut PendingToolCall> {
        self.calls
            .get_mut(call_id)
            .filter(|call| call.status == ToolCallStatus::Collecting)
    }
}
