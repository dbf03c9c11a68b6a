//! Configuration loading, validation, and management for taskloop.
//!
//! Loads configuration from `~/.taskloop/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound accepted for `agent.max_iterations`.
pub const MAX_ITERATIONS_LIMIT: usize = 50;

/// The root configuration structure.
///
/// Maps directly to `~/.taskloop/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Built-in tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// OS-automation backend settings
    #[serde(default)]
    pub automation: AutomationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Iteration bound for a single-step run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_max_iterations() -> usize {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8001
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Range used by `random_number` when called without parameters
    #[serde(default = "default_random_range")]
    pub random_default_range: String,

    /// Maximum characters returned by `file_operations(read:...)`
    #[serde(default = "default_file_read_limit")]
    pub file_read_limit: usize,

    /// Register the OS-automation proxy tools
    #[serde(default = "default_true")]
    pub automation: bool,
}

fn default_random_range() -> String {
    "1-100".into()
}
fn default_file_read_limit() -> usize {
    500
}
fn default_true() -> bool {
    true
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            random_default_range: default_random_range(),
            file_read_limit: default_file_read_limit(),
            automation: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Helper program invoked as `<command> <capability> <operation>`.
    /// When unset, automation tools report themselves unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Per-call timeout for the helper program
    #[serde(default = "default_automation_timeout")]
    pub timeout_secs: u64,
}

fn default_automation_timeout() -> u64 {
    20
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: default_automation_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.taskloop/config.toml).
    ///
    /// Environment variables override file values:
    /// - `TASKLOOP_MAX_ITERATIONS`
    /// - `TASKLOOP_PORT`
    /// - `TASKLOOP_AUTOMATION_COMMAND`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// [`AppConfig::load`]).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("TASKLOOP_MAX_ITERATIONS") {
            self.agent.max_iterations = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "TASKLOOP_MAX_ITERATIONS must be an integer, got '{raw}'"
                ))
            })?;
        }

        if let Some(raw) = lookup("TASKLOOP_PORT") {
            self.gateway.port = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("TASKLOOP_PORT must be a port, got '{raw}'"))
            })?;
        }

        if let Some(command) = lookup("TASKLOOP_AUTOMATION_COMMAND") {
            self.automation.command = Some(command).filter(|c| !c.trim().is_empty());
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".taskloop")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_iterations == 0 || self.agent.max_iterations > MAX_ITERATIONS_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "agent.max_iterations must be between 1 and {MAX_ITERATIONS_LIMIT}"
            )));
        }

        if parse_range(&self.tools.random_default_range).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "tools.random_default_range must look like 'start-end', got '{}'",
                self.tools.random_default_range
            )));
        }

        if self.automation.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "automation.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Render this configuration as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Parse an inclusive `start-end` integer range.
pub fn parse_range(range: &str) -> Option<(i64, i64)> {
    let (start, end) = range.trim().split_once('-')?;
    let start = start.trim().parse().ok()?;
    let end = end.trim().parse().ok()?;
    (start <= end).then_some((start, end))
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.agent.max_iterations, 3);
        assert_eq!(config.gateway.port, 8001);
        assert!(config.tools.automation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = config.to_toml();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.agent.max_iterations, config.agent.max_iterations);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn zero_iterations_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_random_range_rejected() {
        let mut config = AppConfig::default();
        config.tools.random_default_range = "100-1".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().gateway.host, "127.0.0.1");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[agent]
max_iterations = 5

[automation]
command = "automation-helper"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.agent.max_iterations, 5);
        assert_eq!(config.automation.command.as_deref(), Some("automation-helper"));
        assert_eq!(config.automation.timeout_secs, 20);
        assert_eq!(config.tools.file_read_limit, 500);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "agent = [not toml").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("TASKLOOP_MAX_ITERATIONS", "7"),
            ("TASKLOOP_PORT", "9000"),
            ("TASKLOOP_AUTOMATION_COMMAND", "helper"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.agent.max_iterations, 7);
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.automation.command.as_deref(), Some("helper"));
    }

    #[test]
    fn bad_override_is_validation_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|k| (k == "TASKLOOP_PORT").then(|| "not-a-port".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn parse_range_accepts_bounds() {
        assert_eq!(parse_range("1-100"), Some((1, 100)));
        assert_eq!(parse_range(" 5 - 5 "), Some((5, 5)));
        assert_eq!(parse_range("abc"), None);
        assert_eq!(parse_range("9-2"), None);
    }
}
