//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act: do arithmetic,
//! remember facts, read files, or drive the desktop through an
//! automation backend. Every tool takes a single raw parameter string
//! and answers with an [`Observation`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{RegistryError, ToolError};

/// The outcome of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// The tool's output (usually a string).
    pub payload: serde_json::Value,

    /// Whether the tool executed successfully.
    pub succeeded: bool,

    /// Failure description, set only when `succeeded` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Observation {
    /// A successful observation carrying an arbitrary payload.
    pub fn success(payload: impl Into<serde_json::Value>) -> Self {
        Self {
            payload: payload.into(),
            succeeded: true,
            error: None,
        }
    }

    /// A successful observation carrying plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::success(serde_json::Value::String(text.into()))
    }

    /// A failed observation.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            payload: serde_json::Value::Null,
            succeeded: false,
            error: Some(error.into()),
        }
    }

    /// Render the observation as the text the loop reasons over.
    ///
    /// Failures always render as `Error: <message>`.
    pub fn render(&self) -> String {
        if !self.succeeded {
            return format!("Error: {}", self.error.as_deref().unwrap_or("unknown failure"));
        }
        match &self.payload {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// True when the rendered text mentions "error" in any casing.
    pub fn mentions_error(&self) -> bool {
        self.render().to_lowercase().contains("error")
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Self-description of a tool, used for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// The core Tool trait.
///
/// Each tool (calculator, memory_store, file_operations, ...) implements
/// this trait. Tools are registered in the [`ToolRegistry`] at startup and
/// dispatched by name from the agent loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator").
    fn name(&self) -> &str;

    /// A short description of what this tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing the raw parameter string.
    ///
    /// Descriptive only; it is not enforced at call time.
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": { "type": "string" }
            },
            "required": ["input"]
        })
    }

    /// Execute the tool with the raw parameter string.
    async fn execute(&self, input: &str) -> Result<Observation, ToolError>;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools, kept in registration order.
///
/// Tools are registered once at startup; afterwards the registry is shared
/// read-only (typically behind an `Arc`).
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Fails if a tool with the same name already exists.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Result<&dyn Tool, RegistryError> {
        self.index
            .get(name)
            .map(|&i| self.tools[i].as_ref())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// All tools in registration order.
    pub fn list(&self) -> Vec<&dyn Tool> {
        self.tools.iter().map(|t| t.as_ref()).collect()
    }

    /// All registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Tool definitions, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name.
    ///
    /// Never fails: an unknown name yields a failed observation listing every
    /// registered tool, and a tool error is folded into a failed observation
    /// prefixed with the tool name.
    pub async fn dispatch(&self, name: &str, input: &str) -> Observation {
        let tool = match self.lookup(name) {
            Ok(tool) => tool,
            Err(_) => {
                warn!(tool = %name, "Dispatch to unregistered tool");
                return Observation::failure(format!(
                    "Unknown tool '{}'. Available tools: {}",
                    name,
                    self.names().join(", ")
                ));
            }
        };

        debug!(tool = %name, "Dispatching tool");
        match tool.execute(input).await {
            Ok(observation) => observation,
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                Observation::failure(format!("{name}: {e}"))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
            Ok(Observation::text(input))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str { "broken" }
        fn description(&self) -> &str { "Always fails" }
        async fn execute(&self, _input: &str) -> Result<Observation, ToolError> {
            Err(ToolError::ExecutionFailed("boom".into()))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        registry.register(Box::new(BrokenTool)).unwrap();
        registry
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = registry();
        assert!(registry.lookup("echo").is_ok());
        assert_eq!(
            registry.lookup("nonexistent").err(),
            Some(RegistryError::NotFound("nonexistent".into()))
        );
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = registry();
        let err = registry.register(Box::new(EchoTool)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("echo".into()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn list_keeps_registration_order_and_is_stable() {
        let registry = registry();
        let first: Vec<&str> = registry.list().iter().map(|t| t.name()).collect();
        let second: Vec<&str> = registry.list().iter().map(|t| t.name()).collect();
        assert_eq!(first, vec!["echo", "broken"]);
        assert_eq!(first, second);
    }

    #[test]
    fn definitions_follow_registration_order() {
        let names: Vec<String> = registry()
            .definitions()
            .into_iter()
            .map(|def| def.name)
            .collect();
        assert_eq!(names, vec!["echo", "broken"]);
    }

    #[test]
    fn default_schema_describes_input() {
        let def = EchoTool.to_definition();
        assert_eq!(def.name, "echo");
        assert_eq!(def.parameters["required"][0], "input");
    }

    #[tokio::test]
    async fn dispatch_executes_tool() {
        let obs = registry().dispatch("echo", "hello world").await;
        assert!(obs.succeeded);
        assert_eq!(obs.render(), "hello world");
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_lists_registered_names() {
        let registry = registry();
        let obs = registry.dispatch("unknown_tool_xyz", "").await;
        assert!(!obs.succeeded);
        let text = obs.render();
        for name in registry.names() {
            assert!(text.contains(name), "missing {name} in {text}");
        }
    }

    #[tokio::test]
    async fn dispatch_folds_tool_errors() {
        let obs = registry().dispatch("broken", "").await;
        assert!(!obs.succeeded);
        assert_eq!(obs.error.as_deref(), Some("broken: boom"));
        assert!(obs.mentions_error());
    }

    #[test]
    fn observation_renders_non_string_payloads_as_json() {
        let obs = Observation::success(serde_json::json!(["a", "b"]));
        assert_eq!(obs.render(), r#"["a","b"]"#);
        assert!(!obs.mentions_error());
    }
}
