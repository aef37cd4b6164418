//! Transcript store and streaming response buffer.

use std::collections::HashMap;
use voice_types::message::{Message, MessageUpdate};

/// Insertion-ordered store of transcript turns, keyed by message id.
/// At most one message exists per id; updates merge into it.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    index: HashMap<String, usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the message if it is new, otherwise merge the present fields.
    pub fn upsert(&mut self, update: MessageUpdate) -> &Message {
        let idx = match self.index.get(&update.id).copied() {
            Some(idx) => {
                self.messages[idx].apply(update);
                idx
            }
            None => {
                let idx = self.messages.len();
                self.index.insert(update.id.clone(), idx);
                self.messages.push(Message::from_update(update));
                idx
            }
        };
        &self.messages[idx]
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.index.get(id).map(|&idx| &self.messages[idx])
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.index.clear();
    }
}

/// Accumulated assistant text per response id, rebuilt from deltas.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    buffers: HashMap<String, String>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta and return the full text so far.
    pub fn append(&mut self, response_id: &str, delta: &str) -> &str {
        let text = self.buffers.entry(response_id.to_string()).or_default();
        text.push_str(delta);
        text
    }

    pub fn text(&self, response_id: &str) -> Option<&str> {
        self.buffers.get(response_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}
