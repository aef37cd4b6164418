use serde::{Deserialize, Serialize};

/// Top-level client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub realtime: RealtimeConfig,
    pub endpoints: EndpointConfig,
    pub telemetry: TelemetryConfig,
}

impl AgentConfig {
    /// Parse a (possibly partial) JSON document; missing sections take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::AgentError::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Base URL the SDP offer is posted to
    pub url: String,
    pub model: String,
    pub voice: String,
    pub transcription_model: Option<String>,
    pub instructions: String,
    pub data_channel_label: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "https://api.openai.com/v1/realtime".to_string(),
            model: "gpt-4o-realtime-preview".to_string(),
            voice: "verse".to_string(),
            transcription_model: Some("gpt-4o-mini-transcribe".to_string()),
            instructions: DEFAULT_AGENT_INSTRUCTIONS.trim().to_string(),
            data_channel_label: "oai-events".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Endpoint that mints session credentials
    pub session: String,
    /// Remote tool runner. `None` runs the built-in tools in the browser.
    pub tools: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            session: "/api/realtime/session".to_string(),
            tools: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub rtt_interval_ms: u32,
    pub analyser_fft_size: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            rtt_interval_ms: 2000,
            analyser_fft_size: 512,
        }
    }
}

const DEFAULT_AGENT_INSTRUCTIONS: &str = r#"
You are Lumi, an on-call voice concierge for our product team.
Keep responses short (1-2 sentences) and conversational.
When unsure, ask clarifying questions before answering.
Summarize key action items when the user requests a recap.
"#;
