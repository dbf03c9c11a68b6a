//! Error types for the taskloop domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// The top-level error type for taskloop operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Registry errors ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures raised inside a tool. The registry folds these into failed
/// observations, so they never escape a run.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("{0} is not available on this host")]
    Unavailable(String),

    #[error("timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A tool named '{0}' is already registered")]
    DuplicateName(String),

    #[error("Tool not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_displays_tool() {
        let err = Error::Registry(RegistryError::DuplicateName("calculator".into()));
        assert!(err.to_string().contains("calculator"));
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn config_error_carries_message() {
        let err = Error::Config {
            message: "agent.max_iterations must be between 1 and 50".into(),
        };
        assert_eq!(
            err.to_string(),
            "Configuration error: agent.max_iterations must be between 1 and 50"
        );
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = ToolError::Unavailable("screen_capture".into());
        assert_eq!(err.to_string(), "screen_capture is not available on this host");

        let err = ToolError::Timeout { timeout_secs: 20 };
        assert!(err.to_string().contains("20s"));
    }
}
