use serde::{Deserialize, Serialize};

use crate::message::{Message, Role};
use crate::session::SessionStatus;

// ─── Inbound (remote agent → client) ─────────────────────────

/// Events streamed by the remote agent over the data channel.
///
/// Every field is optional: partial frames are expected and the
/// event processor decides what is required for each kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta {
        response_id: Option<String>,
        response: Option<ResponseRef>,
        delta: Option<String>,
    },

    #[serde(rename = "response.completed")]
    ResponseCompleted {
        response_id: Option<String>,
        response: Option<ResponseRef>,
    },

    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    InputTranscriptionCompleted {
        item_id: Option<String>,
        transcript: Option<String>,
    },

    #[serde(rename = "response.output_item.added")]
    OutputItemAdded {
        response_id: Option<String>,
        item: Option<OutputItem>,
    },

    #[serde(rename = "response.function_call_arguments.delta")]
    FunctionCallArgumentsDelta {
        call_id: Option<String>,
        delta: Option<String>,
    },

    #[serde(rename = "response.function_call_arguments.done")]
    FunctionCallArgumentsDone {
        call_id: Option<String>,
        arguments: Option<String>,
    },

    #[serde(rename = "response.error")]
    ResponseError { error: Option<ErrorDetail> },

    /// Any kind this client does not act on
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseRef {
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    pub call_id: Option<String>,
    pub name: Option<String>,
}

impl OutputItem {
    pub fn is_function_call(&self) -> bool {
        self.kind.as_deref() == Some("function_call")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
}

impl ServerEvent {
    pub fn parse(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Response id, taken from `response_id` or falling back to `response.id`.
    pub fn response_id(&self) -> Option<&str> {
        match self {
            ServerEvent::OutputTextDelta { response_id, response, .. }
            | ServerEvent::ResponseCompleted { response_id, response } => response_id
                .as_deref()
                .or_else(|| response.as_ref().and_then(|r| r.id.as_deref())),
            ServerEvent::OutputItemAdded { response_id, .. } => response_id.as_deref(),
            _ => None,
        }
    }
}

// ─── Outbound (client → remote agent) ────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },

    /// Ask the remote agent to continue generating
    #[serde(rename = "response.create")]
    ResponseCreate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ConversationItem {
    #[serde(rename = "message")]
    Message {
        id: String,
        role: Role,
        content: Vec<InputContent>,
    },

    #[serde(rename = "function_call_output")]
    FunctionCallOutput {
        call_id: String,
        /// JSON-encoded result payload
        output: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum InputContent {
    #[serde(rename = "input_text")]
    InputText { text: String },
}

impl ClientEvent {
    pub fn user_text(item_id: impl Into<String>, text: impl Into<String>) -> Self {
        ClientEvent::ConversationItemCreate {
            item: ConversationItem::Message {
                id: item_id.into(),
                role: Role::User,
                content: vec![InputContent::InputText { text: text.into() }],
            },
        }
    }

    pub fn function_call_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        ClientEvent::ConversationItemCreate {
            item: ConversationItem::FunctionCallOutput {
                call_id: call_id.into(),
                output: output.into(),
            },
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ─── Presentation ────────────────────────────────────────────

/// Events emitted by the session for a presentation layer.
/// The UI drains these from the event bus each frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionEvent {
    StatusChanged { status: SessionStatus },

    MessageUpserted { message: Message },

    /// All transcript turns were dropped
    TranscriptCleared,

    ErrorChanged { error: Option<String> },

    #[serde(rename_all = "camelCase")]
    RoundTripChanged { round_trip_ms: Option<u32> },
}
