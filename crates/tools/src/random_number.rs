//! Random number tool: uniform integer in an inclusive `start-end` range.

use async_trait::async_trait;
use rand::Rng;
use taskloop_config::parse_range;
use taskloop_core::error::ToolError;
use taskloop_core::tool::{Observation, Tool};

pub struct RandomNumberTool {
    /// Range used when the call carries no parameters.
    default_range: String,
}

impl RandomNumberTool {
    pub fn new(default_range: impl Into<String>) -> Self {
        Self {
            default_range: default_range.into(),
        }
    }
}

impl Default for RandomNumberTool {
    fn default() -> Self {
        Self::new("1-100")
    }
}

#[async_trait]
impl Tool for RandomNumberTool {
    fn name(&self) -> &str {
        "random_number"
    }

    fn description(&self) -> &str {
        "Generate a random integer in an inclusive range given as 'start-end' (e.g. '1-100')."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "Inclusive range 'start-end'",
                    "default": self.default_range
                }
            }
        })
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        let range = if input.trim().is_empty() {
            self.default_range.as_str()
        } else {
            input
        };

        let (start, end) = parse_range(range).ok_or_else(|| {
            ToolError::InvalidArguments(format!(
                "Use format 'start-end' (e.g., '1-100'), got '{range}'"
            ))
        })?;

        let value = rand::rng().random_range(start..=end);
        Ok(Observation::text(format!(
            "Random number between {start}-{end}: {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(obs: &Observation) -> i64 {
        obs.render().rsplit(": ").next().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn stays_within_bounds() {
        let tool = RandomNumberTool::default();
        for _ in 0..50 {
            let obs = tool.execute("3-7").await.unwrap();
            let v = value_of(&obs);
            assert!((3..=7).contains(&v), "{v} out of range");
        }
    }

    #[tokio::test]
    async fn single_value_range() {
        let obs = RandomNumberTool::default().execute("5-5").await.unwrap();
        assert_eq!(obs.render(), "Random number between 5-5: 5");
    }

    #[tokio::test]
    async fn empty_input_uses_default_range() {
        let obs = RandomNumberTool::new("10-10").execute("").await.unwrap();
        assert_eq!(value_of(&obs), 10);
    }

    #[tokio::test]
    async fn malformed_range_is_error() {
        let tool = RandomNumberTool::default();
        assert!(tool.execute("lots").await.is_err());
        assert!(tool.execute("9-1").await.is_err());
        assert!(tool.execute("1-x").await.is_err());
    }
}
