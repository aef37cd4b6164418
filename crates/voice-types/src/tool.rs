use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Definition of a function the remote agent may call.
/// Follows the realtime session `tools` schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String, // always "function"
    pub name: String,
    pub description: String,
    pub parameters: ToolParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameters {
    #[serde(rename = "type")]
    pub schema_type: String, // always "object"
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: bool,
}

/// What a tool execution collaborator reports back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    Collecting,
    Executing,
    Completed,
    Failed,
}

impl ToolCallStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ToolCallStatus::Completed | ToolCallStatus::Failed)
    }
}

/// One outstanding function call announced by the remote agent
#[derive(Debug, Clone, PartialEq)]
pub struct PendingToolCall {
    pub call_id: String,
    pub tool_name: String,
    pub response_id: String,
    pub item_id: String,
    /// Raw argument text accumulated from deltas
    pub arguments: String,
    /// Transcript message that represents this call
    pub message_id: String,
    pub status: ToolCallStatus,
}

impl PendingToolCall {
    pub fn new(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        response_id: impl Into<String>,
        item_id: impl Into<String>,
    ) -> Self {
        let call_id = call_id.into();
        Self {
            message_id: format!("tool_{}", call_id),
            call_id,
            tool_name: tool_name.into(),
            response_id: response_id.into(),
            item_id: item_id.into(),
            arguments: String::new(),
            status: ToolCallStatus::Collecting,
        }
    }
}

/// Payload carried in a `function_call_output` item
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResultPayload {
    Success {
        content: String,
        data: Map<String, Value>,
    },
    Failure {
        message: String,
    },
}

impl ToolResultPayload {
    pub fn to_value(&self) -> Value {
        match self {
            ToolResultPayload::Success { content, data } => json!({
                "content": content,
                "data": data,
            }),
            ToolResultPayload::Failure { message } => json!({
                "error": true,
                "message": message,
            }),
        }
    }

    /// JSON text sent as the `output` of a function call item
    pub fn encode(&self) -> String {
        self.to_value().to_string()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResultPayload::Failure { .. })
    }
}
