use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Realtime channel is not ready yet.")]
    ChannelNotReady,

    #[error("{0}")]
    Tool(String),

    #[error("Malformed tool arguments: {0}")]
    MalformedArguments(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Text to show a user. Credential and transport failures carry their own wording.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Credential(message) | AgentError::Transport(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(e: serde_json::Error) -> Self {
        AgentError::Serialization(e.to_string())
    }
}
