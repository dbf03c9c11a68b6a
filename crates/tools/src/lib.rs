//! Built-in tool implementations for taskloop.
//!
//! Tools give the agent the ability to act: do arithmetic, analyze text,
//! tell the time, pick random numbers, remember facts, touch the
//! filesystem, and drive the desktop through an automation backend.

pub mod automation;
pub mod calculator;
pub mod current_time;
pub mod file_operations;
pub mod memory_store;
pub mod random_number;
pub mod text_analyzer;

use std::sync::Arc;
use std::time::Duration;
use taskloop_config::AppConfig;
use taskloop_core::error::RegistryError;
use taskloop_core::tool::ToolRegistry;

pub use automation::{AutomationBackend, AutomationTool, CommandBackend, UnavailableBackend};
pub use memory_store::MemoryStore;

/// Pick the automation backend described by `config`.
pub fn automation_backend(config: &AppConfig) -> Arc<dyn AutomationBackend> {
    let timeout = Duration::from_secs(config.automation.timeout_secs);
    match config
        .automation
        .command
        .as_deref()
        .and_then(|command| CommandBackend::new(command, timeout))
    {
        Some(backend) => Arc::new(backend),
        None => Arc::new(UnavailableBackend),
    }
}

/// Create a tool registry with every built-in tool.
///
/// `memory` is shared with the caller so remembered facts can be counted
/// outside the tool.
pub fn default_registry(
    config: &AppConfig,
    memory: Arc<MemoryStore>,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(calculator::CalculatorTool))?;
    registry.register(Box::new(text_analyzer::TextAnalyzerTool))?;
    registry.register(Box::new(current_time::CurrentTimeTool))?;
    registry.register(Box::new(random_number::RandomNumberTool::new(
        config.tools.random_default_range.clone(),
    )))?;
    registry.register(Box::new(memory_store::MemoryStoreTool::new(memory)))?;
    registry.register(Box::new(file_operations::FileOperationsTool::new(
        config.tools.file_read_limit,
    )))?;

    if config.tools.automation {
        for tool in AutomationTool::all(automation_backend(config)) {
            registry.register(Box::new(tool))?;
        }
    }

    Ok(registry)
}
