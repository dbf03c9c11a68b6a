//! The agent loop: the heart of taskloop.
//!
//! The agent follows a **Think → Act → Observe** cycle:
//!
//! 1. **Decompose** the request into sub-tasks on connective phrases
//! 2. **Think**: the reasoning rule table proposes a tool call
//! 3. **Act**: the step executor parses the call and dispatches the tool
//! 4. **Observe**: the observation is appended to the trace
//!
//! The loop stops when an action succeeds without reporting an error, or
//! when the iteration bound is reached.

pub mod decomposer;
pub mod executor;
pub mod loop_runner;
pub mod reasoning;

pub use decomposer::{TaskDecomposer, TaskPlan};
pub use executor::{NO_ACTION_HINT, StepExecutor};
pub use loop_runner::Agent;
