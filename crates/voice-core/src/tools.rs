//! Built-in tool definitions, tool registry, and the in-browser executor.
//!
//! Definitions follow the realtime session `tools` schema and are sent to
//! the remote agent when the session is minted.

use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{Local, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use voice_types::{
    AgentError, Result,
    tool::{ToolDefinition, ToolOutput, ToolParameters},
};

use crate::ports::{ToolExecutorPort, WeatherPort};

pub const GET_WEATHER_FORECAST: &str = "get_weather_forecast";
pub const GET_CURRENT_TIME: &str = "get_current_time";

/// Registry of tools advertised to the remote agent
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };
        registry.register_builtins();
        registry
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Definitions sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().cloned().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    fn register(&mut self, tool: ToolDefinition) {
        self.tools.insert(tool.name.clone(), tool);
    }

    fn register_builtins(&mut self) {
        self.register(Self::weather_tool());
        self.register(Self::current_time_tool());
    }

    fn weather_tool() -> ToolDefinition {
        let mut props = Map::new();
        props.insert("location".to_string(), json!({
            "type": "string",
            "description": "Human readable location name such as 'San Francisco, CA' or 'Tokyo, Japan'."
        }));

        ToolDefinition {
            kind: "function".to_string(),
            name: GET_WEATHER_FORECAST.to_string(),
            description: "Get the current weather and a short forecast for a city. \
                Prioritize major global locations."
                .to_string(),
            parameters: ToolParameters {
                schema_type: "object".to_string(),
                properties: props,
                required: vec!["location".to_string()],
                additional_properties: false,
            },
        }
    }

    fn current_time_tool() -> ToolDefinition {
        ToolDefinition {
            kind: "function".to_string(),
            name: GET_CURRENT_TIME.to_string(),
            description: "Return the current time in ISO 8601 format. Helpful when the user \
                asks about the time or scheduling."
                .to_string(),
            parameters: ToolParameters {
                schema_type: "object".to_string(),
                properties: Map::new(),
                required: Vec::new(),
                additional_properties: false,
            },
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a JSON arguments string. An empty buffer is an empty object.
pub fn parse_tool_args(args: &str) -> std::result::Result<Value, serde_json::Error> {
    if args.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(args)
}

// ─── Built-in executor ───────────────────────────────────────

/// Runs the built-in tools inside the client.
pub struct BuiltinToolExecutor {
    weather: Option<Rc<dyn WeatherPort>>,
}

impl BuiltinToolExecutor {
    pub fn new(weather: Option<Rc<dyn WeatherPort>>) -> Self {
        Self { weather }
    }

    async fn weather_forecast(&self, args: &Value) -> Result<ToolOutput> {
        let location = args
            .get("location")
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
            .ok_or_else(|| AgentError::Tool("`location` must be a non-empty string".to_string()))?;
        let weather = self
            .weather
            .as_ref()
            .ok_or_else(|| AgentError::Tool("Weather lookups are not available".to_string()))?;

        let payload = weather.forecast(location).await?;
        summarize_weather(location, &payload)
    }
}

#[async_trait(?Send)]
impl ToolExecutorPort for BuiltinToolExecutor {
    async fn execute(&self, tool_name: &str, args: Value) -> Result<ToolOutput> {
        match tool_name {
            GET_CURRENT_TIME => Ok(current_time()),
            GET_WEATHER_FORECAST => self.weather_forecast(&args).await,
            other => Err(AgentError::Tool(format!("Unhandled tool: {}", other))),
        }
    }
}

pub fn current_time() -> ToolOutput {
    let now = Utc::now();
    let iso = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut data = Map::new();
    data.insert("iso".to_string(), json!(iso));
    data.insert(
        "locale".to_string(),
        json!(now.with_timezone(&Local).format("%c").to_string()),
    );

    ToolOutput {
        content: Some(format!("Current time is {}", iso)),
        data: Some(data),
    }
}

/// Hourly slots reported as the morning/afternoon/evening forecast
const FORECAST_SLOTS: [(usize, &str); 3] = [(2, "Morning"), (4, "Afternoon"), (7, "Evening")];

/// Turn a wttr.in `format=j1` document into a one-line summary plus structured data.
pub fn summarize_weather(location: &str, payload: &Value) -> Result<ToolOutput> {
    let current = payload
        .pointer("/current_condition/0")
        .ok_or_else(|| AgentError::Tool("Weather API returned an unexpected payload".to_string()))?;

    let description = current
        .pointer("/weatherDesc/0/value")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");
    let temp_c = first_str(current, &["temp_C", "temp_c", "tempC"]);
    let feels_like_c = first_str(current, &["FeelsLikeC", "feelsLikeC", "FeelsLike_C"]);

    let mut summary = vec![format!(
        "Currently {} and {}°C",
        description.to_lowercase(),
        temp_c.unwrap_or("?")
    )];
    if let Some(feels) = feels_like_c {
        summary.push(format!("feels like {}°C", feels));
    }

    let today = payload.pointer("/weather/0");
    let forecast = today
        .and_then(|day| day.get("hourly"))
        .and_then(Value::as_array)
        .map(|hourly| {
            FORECAST_SLOTS
                .iter()
                .filter_map(|(slot, label)| {
                    hourly.get(*slot).map(|hour| {
                        format!("{}: {}°C", label, first_str(hour, &["tempC", "temp_c"]).unwrap_or("?"))
                    })
                })
                .collect::<Vec<_>>()
        })
        .filter(|snippets| !snippets.is_empty())
        .map(|snippets| snippets.join(", "));

    let mut parts = vec![format!("Weather for {}:", location), summary.join(", ")];
    if let Some(forecast) = forecast {
        parts.push(format!("Forecast: {}", forecast));
    }

    let resolved_location = payload
        .pointer("/nearest_area/0/areaName/0/value")
        .and_then(Value::as_str)
        .unwrap_or(location);

    let mut data = Map::new();
    data.insert("provider".to_string(), json!("wttr.in"));
    data.insert("location".to_string(), json!(resolved_location));
    data.insert("description".to_string(), json!(description));
    data.insert("temperatureC".to_string(), json!(temp_c));
    data.insert("feelsLikeC".to_string(), json!(feels_like_c));
    data.insert("humidity".to_string(), current.get("humidity").cloned().unwrap_or(Value::Null));
    data.insert("forecast".to_string(), today.cloned().unwrap_or(Value::Null));

    Ok(ToolOutput {
        content: Some(parts.join(" ")),
        data: Some(data),
    })
}

fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| value.get(*key).and_then(Value::as_str))
}
