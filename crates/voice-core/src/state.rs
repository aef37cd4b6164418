//! Conversation state shared by the event processor and the tool orchestrator.
//!
//! All mutation goes through `&mut SessionState`; the session owns it inside a
//! single `RefCell` and never holds the borrow across an await point.

use std::rc::Rc;

use voice_types::{
    AgentError, Result,
    event::{ClientEvent, SessionEvent},
    message::MessageUpdate,
    session::SessionStatus,
};

use crate::event_bus::EventBus;
use crate::ports::RealtimeLink;
use crate::registry::ToolCallRegistry;
use crate::transcript::{ResponseBuffer, Transcript};

pub struct SessionState {
    pub status: SessionStatus,
    pub last_error: Option<String>,
    /// Advanced on every start and reset; tasks compare it to detect a stale session.
    pub epoch: u64,
    pub transcript: Transcript,
    pub tool_calls: ToolCallRegistry,
    pub responses: ResponseBuffer,
    link: Option<Rc<dyn RealtimeLink>>,
    bus: EventBus,
}

impl SessionState {
    pub fn new(bus: EventBus) -> Self {
        Self {
            status: SessionStatus::Idle,
            last_error: None,
            epoch: 0,
            transcript: Transcript::new(),
            tool_calls: ToolCallRegistry::new(),
            responses: ResponseBuffer::new(),
            link: None,
            bus,
        }
    }

    /// Upsert a transcript turn and publish the merged message.
    pub fn upsert(&mut self, update: MessageUpdate) {
        let message = self.transcript.upsert(update).clone();
        self.bus.emit(SessionEvent::MessageUpserted { message });
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        if self.status != status {
            self.status = status;
            self.bus.emit(SessionEvent::StatusChanged { status });
        }
    }

    pub fn set_error(&mut self, error: Option<String>) {
        if self.last_error != error {
            self.last_error = error.clone();
            self.bus.emit(SessionEvent::ErrorChanged { error });
        }
    }

    /// Drop transcript, in-flight tool calls and response buffers.
    pub fn clear_conversation(&mut self) {
        self.tool_calls.clear();
        self.responses.clear();
        if !self.transcript.is_empty() {
            self.transcript.clear();
            self.bus.emit(SessionEvent::TranscriptCleared);
        }
    }

    pub fn attach_link(&mut self, link: Rc<dyn RealtimeLink>) {
        self.link = Some(link);
    }

    pub fn detach_link(&mut self) -> Option<Rc<dyn RealtimeLink>> {
        self.link.take()
    }

    pub fn link(&self) -> Option<Rc<dyn RealtimeLink>> {
        self.link.clone()
    }

    /// Send one client event. Rejected, never queued, when the channel is not open.
    pub fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let link = match &self.link {
            Some(link) if link.is_open() => link.clone(),
            _ => {
                log::warn!("Dropping client event: realtime channel is not open");
                self.set_error(Some(AgentError::ChannelNotReady.to_string()));
                return Err(AgentError::ChannelNotReady);
            }
        };
        link.send(&event.to_json()?)
    }
}
