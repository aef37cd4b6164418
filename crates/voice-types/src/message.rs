use serde::{Deserialize, Serialize};

/// Speaker of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Streaming,
    Complete,
}

/// A single turn in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Remote response/item id, or a locally generated one
    pub id: String,
    pub role: Role,
    pub content: String,
    pub status: MessageStatus,
    /// Present when role == Tool
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_name: Option<String>,
}

/// Partial update for a transcript turn.
/// Fields left as `None` keep whatever the existing message already holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageUpdate {
    pub id: String,
    pub role: Option<Role>,
    pub content: Option<String>,
    pub status: Option<MessageStatus>,
    pub tool_name: Option<String>,
}

impl MessageUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = Some(name.into());
        self
    }
}

impl Message {
    /// Build a new message, defaulting unset fields to an empty streaming assistant turn.
    pub fn from_update(update: MessageUpdate) -> Self {
        Self {
            id: update.id,
            role: update.role.unwrap_or(Role::Assistant),
            content: update.content.unwrap_or_default(),
            status: update.status.unwrap_or(MessageStatus::Streaming),
            tool_name: update.tool_name,
        }
    }

    /// Merge an update into this message. The id is never changed.
    pub fn apply(&mut self, update: MessageUpdate) {
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(name) = update.tool_name {
            self.tool_name = Some(name);
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.status == MessageStatus::Streaming
    }
}
