//! Run results, trace entries, and agent state types.

use serde::{Deserialize, Serialize};

use crate::action::AgentAction;
use crate::tool::Observation;

/// One think→act→observe iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// 1-based iteration number within its run.
    pub iteration: usize,
    pub thought: String,
    /// `None` when the thought contained no parseable action.
    pub action: Option<AgentAction>,
    pub observation: Observation,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Completed,
    Failed,
}

/// The outcome of one top-level request.
///
/// Multi-step requests aggregate one `RunResult` per executed sub-task in
/// `step_results`; their trace and invoked tools are the concatenation of
/// the sub-task runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,
    pub input: String,
    pub final_text: String,
    pub state: RunState,
    pub iteration_count: usize,
    pub trace: Vec<TraceEntry>,
    /// Rendered calls (`tool(params)`) in invocation order.
    pub tools_invoked: Vec<String>,
    /// The sub-task plan this run executed.
    pub plan: Vec<String>,
    pub total_steps: usize,
    pub completed_steps: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub step_results: Vec<RunResult>,
}

impl RunResult {
    pub fn is_multi_step(&self) -> bool {
        self.total_steps > 1
    }

    /// Pretty-printed JSON form, as printed by `taskloop run --json`.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The observation the final answer was taken from.
    pub fn last_observation(&self) -> Option<&Observation> {
        self.trace.last().map(|entry| &entry.observation)
    }

    /// Human-readable scratchpad lines for the whole run.
    pub fn scratchpad(&self) -> Vec<String> {
        if !self.is_multi_step() {
            return self.single_scratchpad();
        }

        let mut lines = vec![format!("Multi-Step Task Detected: {} steps", self.total_steps)];
        for (i, step) in self.plan.iter().enumerate() {
            lines.push(format!("Step {}: {}", i + 1, step));
        }
        for (i, result) in self.step_results.iter().enumerate() {
            let n = i + 1;
            lines.push(format!("=== EXECUTING STEP {}/{} ===", n, self.total_steps));
            lines.extend(result.single_scratchpad());
            lines.push(format!("Step {} Result: {}", n, result.final_text));
        }
        if self.completed_steps < self.total_steps {
            lines.push(format!(
                "Step {} failed. Stopping multi-step execution.",
                self.completed_steps
            ));
        }
        lines
    }

    fn single_scratchpad(&self) -> Vec<String> {
        let mut lines = vec![format!("User Request: {}", self.input)];
        for entry in &self.trace {
            lines.push(format!("Thought {}: {}", entry.iteration, entry.thought));
            if let Some(action) = &entry.action {
                lines.push(format!("Action {}: {}", entry.iteration, action.render()));
            }
            lines.push(format!(
                "Observation {}: {}",
                entry.iteration,
                entry.observation.render()
            ));
        }
        lines
    }
}

/// Snapshot of the agent, for health and state queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub registered_tools: Vec<String>,
    pub memory_items: usize,
    /// Trace length of the most recent run.
    pub last_trace_size: usize,
    pub runs_completed: u64,
}
