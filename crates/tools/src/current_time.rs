//! Current time tool: local wall-clock time in a requested format.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use taskloop_core::error::ToolError;
use taskloop_core::tool::{Observation, Tool};

const STANDARD_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CurrentTimeTool;

/// Render `now` for the given format keyword.
///
/// `standard` and `timestamp` are recognised; anything else falls back to
/// the standard layout.
pub fn format_time(now: DateTime<Local>, format: &str) -> String {
    match format.trim().to_lowercase().as_str() {
        "standard" => format!("Current time: {}", now.format(STANDARD_FORMAT)),
        "timestamp" => format!("Unix timestamp: {}", now.timestamp()),
        _ => format!("Current time (default): {}", now.format(STANDARD_FORMAT)),
    }
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current local time. Formats: 'standard' (YYYY-MM-DD HH:MM:SS) or 'timestamp'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "enum": ["standard", "timestamp"],
                    "default": "standard"
                }
            }
        })
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        Ok(Observation::text(format_time(Local::now(), input)))
    }
}
