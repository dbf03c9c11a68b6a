//! OS-automation proxy tools.
//!
//! Screen capture, window, mouse, keyboard, clipboard, system info and
//! network tools all share one shape: the agent hands over a capability
//! name and a command string, and an [`AutomationBackend`] does the work.
//! Without a configured helper program every call reports the capability
//! as unavailable.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use taskloop_core::error::ToolError;
use taskloop_core::tool::{Observation, Tool};
use tokio::process::Command;
use tracing::{debug, warn};

/// `(name, description)` of every automation tool, in registration order.
pub const AUTOMATION_TOOLS: [(&str, &str); 7] = [
    (
        "screen_capture",
        "Capture the screen. Operations: 'screenshot'.",
    ),
    (
        "window_management",
        "Inspect and control windows. Operations: 'list', 'active', 'focus:<title>'.",
    ),
    (
        "mouse_control",
        "Drive the mouse. Operations: 'click [x y]', 'move x y', 'scroll up|down'.",
    ),
    (
        "keyboard_control",
        "Send keystrokes. Operations: 'type:<text>', 'keys:<combination>'.",
    ),
    (
        "clipboard_management",
        "Work with the clipboard. Operations: 'copy:<text>', 'paste', 'clear'.",
    ),
    (
        "system_info",
        "Report host information. Operations: 'hardware', 'os', 'disk', 'processes'.",
    ),
    (
        "network_operations",
        "Network diagnostics. Operations: 'ping:<host>', 'speed', 'info'.",
    ),
];

/// Performs automation commands on behalf of the proxy tools.
#[async_trait]
pub trait AutomationBackend: Send + Sync {
    /// Run `command` for `capability` and return its textual output.
    async fn perform(&self, capability: &str, command: &str) -> Result<String, ToolError>;
}

/// Backend used when no helper is configured.
pub struct UnavailableBackend;

#[async_trait]
impl AutomationBackend for UnavailableBackend {
    async fn perform(&self, capability: &str, _command: &str) -> Result<String, ToolError> {
        Err(ToolError::Unavailable(capability.to_string()))
    }
}

/// Runs a helper program as `<program> [args..] <capability> <command>`.
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandBackend {
    /// `command_line` is split on whitespace; the first word is the program.
    pub fn new(command_line: &str, timeout: Duration) -> Option<Self> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
            timeout,
        })
    }
}

#[async_trait]
impl AutomationBackend for CommandBackend {
    async fn perform(&self, capability: &str, command: &str) -> Result<String, ToolError> {
        debug!(program = %self.program, capability, command, "Running automation helper");

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(capability)
            .arg(command)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ToolError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| {
                ToolError::ExecutionFailed(format!("failed to start '{}': {e}", self.program))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let code = output.status.code().unwrap_or(-1);
        warn!(capability, exit_code = code, "Automation helper failed");
        let detail = if stderr.is_empty() { stdout } else { stderr };
        Err(ToolError::ExecutionFailed(format!(
            "[exit code: {code}] {detail}"
        )))
    }
}

/// A tool whose body is delegated to an [`AutomationBackend`].
pub struct AutomationTool {
    name: &'static str,
    description: &'static str,
    backend: Arc<dyn AutomationBackend>,
}

impl AutomationTool {
    pub fn new(
        name: &'static str,
        description: &'static str,
        backend: Arc<dyn AutomationBackend>,
    ) -> Self {
        Self {
            name,
            description,
            backend,
        }
    }

    /// One tool per entry of [`AUTOMATION_TOOLS`], all sharing `backend`.
    pub fn all(backend: Arc<dyn AutomationBackend>) -> Vec<Self> {
        AUTOMATION_TOOLS
            .iter()
            .map(|&(name, description)| Self::new(name, description, backend.clone()))
            .collect()
    }
}

#[async_trait]
impl Tool for AutomationTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        let output = self.backend.perform(self.name, input.trim()).await?;
        if output.is_empty() {
            return Ok(Observation::text(format!("{}: {} done", self.name, input.trim())));
        }
        Ok(Observation::text(output))
    }
}
