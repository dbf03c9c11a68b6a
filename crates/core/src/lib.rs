//! # taskloop core
//!
//! Domain types, traits, and error definitions for the taskloop agent
//! runtime. It defines the tool contract, the action grammar, and the
//! run/trace model that the other crates implement against. It does no
//! I/O of its own.

pub mod action;
pub mod agent;
pub mod error;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use action::{AgentAction, parse_action};
pub use agent::{AgentState, RunResult, RunState, TraceEntry};
pub use error::{Error, RegistryError, Result, ToolError};
pub use tool::{Observation, Tool, ToolDefinition, ToolRegistry};
