use serde::{Deserialize, Serialize};

use crate::config::RealtimeConfig;
use crate::tool::ToolDefinition;

/// Connection lifecycle of the single active session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Connecting,
    Connected,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
        }
    }

    /// Human-readable indicator text
    pub fn label(&self) -> &str {
        match self {
            SessionStatus::Idle => "Idle",
            SessionStatus::Connecting => "Connecting…",
            SessionStatus::Connected => "Connected",
        }
    }
}

/// Ephemeral credential minted by the session endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCredential {
    pub client_secret: ClientSecret,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSecret {
    pub value: String,
}

/// Session parameters posted to the credential endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRequest {
    pub model: String,
    pub voice: String,
    pub modalities: Vec<String>,
    pub instructions: String,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_audio_transcription: Option<TranscriptionSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionSettings {
    pub model: String,
}

impl SessionRequest {
    pub fn new(config: &RealtimeConfig, tools: Vec<ToolDefinition>) -> Self {
        Self {
            model: config.model.clone(),
            voice: config.voice.clone(),
            modalities: vec!["text".to_string(), "audio".to_string()],
            instructions: config.instructions.clone(),
            tools,
            tool_choice: "auto".to_string(),
            input_audio_transcription: config
                .transcription_model
                .clone()
                .map(|model| TranscriptionSettings { model }),
        }
    }
}

/// One ICE candidate pair from a transport stats report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePairStats {
    pub succeeded: bool,
    /// Seconds, as reported by the transport
    pub current_round_trip_time: Option<f64>,
}
