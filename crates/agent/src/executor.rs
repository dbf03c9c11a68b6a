//! Step executor: one think → act → observe iteration.

use std::sync::Arc;
use taskloop_core::action::AgentAction;
use taskloop_core::agent::TraceEntry;
use taskloop_core::tool::{Observation, ToolRegistry};
use tracing::debug;

/// Observation recorded when reasoning names no tool.
pub const NO_ACTION_HINT: &str =
    "No valid action found. Use format: Action: tool_name(parameters)";

/// Parses reasoning text and dispatches the named tool.
pub struct StepExecutor {
    tools: Arc<ToolRegistry>,
}

impl StepExecutor {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one iteration. Never fails: parse failures and tool errors both
    /// end up as failed observations in the returned entry.
    pub async fn execute_step(&self, reasoning: &str, iteration: usize) -> TraceEntry {
        let Some(action) = AgentAction::parse(reasoning) else {
            debug!(iteration, "No action in reasoning");
            return TraceEntry {
                iteration,
                thought: reasoning.to_string(),
                action: None,
                observation: Observation::failure(NO_ACTION_HINT),
            };
        };

        debug!(iteration, tool = %action.tool_name, "Executing action");
        let observation = self.tools.dispatch(&action.tool_name, action.input()).await;

        TraceEntry {
            iteration,
            thought: reasoning.to_string(),
            action: Some(action),
            observation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskloop_config::AppConfig;
    use taskloop_tools::{MemoryStore, default_registry};

    fn executor() -> StepExecutor {
        let registry = default_registry(&AppConfig::default(), Arc::new(MemoryStore::new())).unwrap();
        StepExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn dispatches_parsed_action() {
        let entry = executor()
            .execute_step("This looks like math. Action: calculator(2 + 2)", 1)
            .await;
        assert_eq!(entry.iteration, 1);
        assert_eq!(entry.action.as_ref().map(|a| a.render()).as_deref(), Some("calculator(2 + 2)"));
        assert!(entry.observation.succeeded);
        assert!(entry.observation.render().contains("= 4"));
    }

    #[tokio::test]
    async fn missing_action_yields_hint() {
        let entry = executor().execute_step("just thinking", 2).await;
        assert!(entry.action.is_none());
        assert!(!entry.observation.succeeded);
        assert_eq!(entry.observation.error.as_deref(), Some(NO_ACTION_HINT));
    }

    #[tokio::test]
    async fn unknown_tool_is_failed_observation() {
        let entry = executor().execute_step("Action: teleport(mars)", 1).await;
        assert!(entry.action.is_some());
        assert!(!entry.observation.succeeded);
        assert!(entry.observation.render().contains("calculator"));
    }

    #[tokio::test]
    async fn division_by_zero_does_not_escape() {
        let entry = executor().execute_step("Action: calculator(1/0)", 1).await;
        assert!(!entry.observation.succeeded);
        assert!(entry.observation.render().contains("Division by zero"));
    }
}
