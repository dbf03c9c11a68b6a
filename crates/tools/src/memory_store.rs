//! Memory store tool: facts the user asked the agent to remember.
//!
//! Entries live in a [`MemoryStore`] shared between the tool and the agent,
//! so they survive across runs of the same agent instance. A fresh agent
//! starts with an empty store.

use async_trait::async_trait;
use std::sync::Arc;
use taskloop_core::error::ToolError;
use taskloop_core::tool::{Observation, Tool};
use tokio::sync::RwLock;
use tracing::debug;

const RECALL_COMMANDS: [&str; 3] = ["recall", "remember", "what do i know"];

/// Append-only list of remembered facts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, entry: impl Into<String>) {
        self.entries.write().await.push(entry.into());
    }

    /// Snapshot of every entry, oldest first.
    pub async fn entries(&self) -> Vec<String> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

pub struct MemoryStoreTool {
    store: Arc<MemoryStore>,
}

impl MemoryStoreTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for MemoryStoreTool {
    fn name(&self) -> &str {
        "memory_store"
    }

    fn description(&self) -> &str {
        "Remember facts for later. Use 'store:<information>' to save and 'recall' to list everything remembered."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "'store:<information>' or 'recall'"
                }
            },
            "required": ["input"]
        })
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        if let Some(info) = input.strip_prefix("store:") {
            let entry = info.trim().to_lowercase();
            debug!(entry = %entry, "Storing memory");
            self.store.append(entry.clone()).await;
            return Ok(Observation::text(format!("Stored in memory: {entry}")));
        }

        let command = input.trim().to_lowercase();
        if RECALL_COMMANDS.contains(&command.as_str()) {
            let entries = self.store.entries().await;
            if entries.is_empty() {
                return Ok(Observation::text("Memory is empty"));
            }
            return Ok(Observation::text(format!("Recent memory: {entries:?}")));
        }

        Err(ToolError::InvalidArguments(
            "Use 'store:information' to store or 'recall' to remember".into(),
        ))
    }
}
