//! `VoiceAgent`, the JavaScript-facing handle around one voice session.

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use voice_core::ports::{ToolExecutorPort, WeatherPort};
use voice_core::session::{SessionPorts, VoiceSession};
use voice_core::tools::{BuiltinToolExecutor, ToolRegistry};
use voice_platform::credentials::HttpCredentialProvider;
use voice_platform::timer::{BrowserSpawner, BrowserTimer};
use voice_platform::tools::{HttpToolExecutor, WttrWeather};
use voice_platform::transport::WebRtcTransport;
use voice_types::{AgentError, config::AgentConfig, session::SessionRequest};

#[wasm_bindgen]
pub struct VoiceAgent {
    session: VoiceSession,
    registry: ToolRegistry,
}

#[wasm_bindgen]
impl VoiceAgent {
    /// Build an agent from an optional (partial) JSON config document.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<VoiceAgent, JsValue> {
        let config = match config {
            Some(json) => AgentConfig::from_json(&json).map_err(to_js)?,
            None => AgentConfig::default(),
        };
        Ok(Self::with_config(config))
    }

    /// Resolves once the transport is negotiated; rejects with the failure text.
    pub fn start(&self) -> js_sys::Promise {
        let session = self.session.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            session.start().await.map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn stop(&self) {
        self.session.stop();
    }

    #[wasm_bindgen(js_name = sendText)]
    pub fn send_text(&self, text: &str) -> Result<(), JsValue> {
        self.session.send_text(text).map_err(to_js)
    }

    pub fn status(&self) -> String {
        self.session.status().as_str().to_string()
    }

    #[wasm_bindgen(js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.session.last_error()
    }

    /// Smoothed microphone level in [0, 1]
    #[wasm_bindgen(js_name = inputLevel)]
    pub fn input_level(&self) -> f32 {
        self.session.input_level().clamp(0.0, 1.0)
    }

    #[wasm_bindgen(js_name = roundTripMs)]
    pub fn round_trip_ms(&self) -> Option<u32> {
        self.session.round_trip_ms()
    }

    /// Transcript as a JSON array of messages
    pub fn transcript(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.transcript()).map_err(|e| to_js(e.into()))
    }

    /// Pending session events as a JSON array; empties the queue
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.drain_events()).map_err(|e| to_js(e.into()))
    }

    #[wasm_bindgen(js_name = toolDefinitions)]
    pub fn tool_definitions(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.registry.definitions()).map_err(|e| to_js(e.into()))
    }
}

impl VoiceAgent {
    fn with_config(config: AgentConfig) -> Self {
        let registry = ToolRegistry::new();
        let request = SessionRequest::new(&config.realtime, registry.definitions());

        let tools: Rc<dyn ToolExecutorPort> = match &config.endpoints.tools {
            Some(endpoint) => {
                log::info!("Running tools through {}", endpoint);
                Rc::new(HttpToolExecutor::new(endpoint.clone()))
            }
            None => {
                let weather: Rc<dyn WeatherPort> = Rc::new(WttrWeather::new());
                Rc::new(BuiltinToolExecutor::new(Some(weather)))
            }
        };

        let ports = SessionPorts {
            credentials: Rc::new(HttpCredentialProvider::new(config.endpoints.session.clone(), request)),
            transport: Rc::new(WebRtcTransport::new(
                config.realtime.clone(),
                config.telemetry.analyser_fft_size,
            )),
            tools,
            timer: Rc::new(BrowserTimer),
            spawner: Rc::new(BrowserSpawner),
        };

        Self {
            session: VoiceSession::new(ports, config.telemetry),
            registry,
        }
    }
}

impl Drop for VoiceAgent {
    fn drop(&mut self) {
        self.session.stop();
    }
}

fn to_js(error: AgentError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
