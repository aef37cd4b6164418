//! Tool adapters: a remote tool runner and the wttr.in weather source.

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::{json, Value};

use voice_core::ports::{ToolExecutorPort, WeatherPort};
use voice_types::{AgentError, Result, tool::ToolOutput};

// ─── Remote tool runner ──────────────────────────────────────

/// Runs tools on the host's tool endpoint instead of in the browser.
pub struct HttpToolExecutor {
    endpoint: String,
}

impl HttpToolExecutor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ToolRunResponse {
    #[serde(default)]
    success: bool,
    result: Option<ToolOutput>,
    error: Option<String>,
}

/// Interpret a tool endpoint reply. Anything but a successful result is a tool failure.
fn tool_result(tool_name: &str, ok: bool, status: u16, reply: ToolRunResponse) -> Result<ToolOutput> {
    match reply {
        ToolRunResponse {
            success: true,
            result: Some(result),
            ..
        } if ok => Ok(result),
        reply => Err(AgentError::Tool(reply.error.unwrap_or_else(|| {
            format!("Tool {} failed with status {}", tool_name, status)
        }))),
    }
}

#[async_trait(?Send)]
impl ToolExecutorPort for HttpToolExecutor {
    async fn execute(&self, tool_name: &str, args: Value) -> Result<ToolOutput> {
        let body = json!({
            "toolName": tool_name,
            "arguments": args,
        });

        let response = Request::post(&self.endpoint)
            .json(&body)
            .map_err(|e| AgentError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;

        let ok = response.ok();
        let status = response.status();
        let reply = match response.json::<ToolRunResponse>().await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Tool endpoint returned an unreadable body: {}", e);
                ToolRunResponse::default()
            }
        };
        tool_result(tool_name, ok, status, reply)
    }
}

// ─── Weather ─────────────────────────────────────────────────

pub struct WttrWeather {
    base_url: String,
}

impl WttrWeather {
    pub fn new() -> Self {
        Self::with_base_url("https://wttr.in")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn forecast_url(&self, location: &str) -> String {
        let location: String = js_sys::encode_uri_component(location).into();
        format!("{}/{}?format=j1", self.base_url.trim_end_matches('/'), location)
    }
}

impl Default for WttrWeather {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl WeatherPort for WttrWeather {
    async fn forecast(&self, location: &str) -> Result<Value> {
        let response = Request::get(&self.forecast_url(location))
            .send()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(AgentError::Tool(format!(
                "Weather API request failed with status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::Tool(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> ToolRunResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_tool_result_success() {
        let output = tool_result(
            "get_current_time",
            true,
            200,
            reply(r#"{"success":true,"result":{"content":"Current time is now","data":{"iso":"x"}}}"#),
        )
        .unwrap();
        assert_eq!(output.content.as_deref(), Some("Current time is now"));
        assert_eq!(output.data.unwrap()["iso"], "x");
    }

    #[test]
    fn test_tool_result_reported_error() {
        let err = tool_result(
            "get_weather_forecast",
            false,
            400,
            reply(r#"{"success":false,"error":"Location not found"}"#),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Location not found");
    }

    #[test]
    fn test_tool_result_falls_back_to_status() {
        let err = tool_result("get_weather_forecast", false, 502, ToolRunResponse::default()).unwrap_err();
        assert_eq!(err.to_string(), "Tool get_weather_forecast failed with status 502");

        // A 2xx reply without a result is still a failure
        let err = tool_result("get_current_time", true, 200, reply(r#"{"success":true}"#)).unwrap_err();
        assert_eq!(err.to_string(), "Tool get_current_time failed with status 200");
    }
}
