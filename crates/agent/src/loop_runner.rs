//! The agent loop: drives reasoning, tool calls and observations.

use std::sync::Arc;
use taskloop_config::{AppConfig, MAX_ITERATIONS_LIMIT};
use taskloop_core::Error;
use taskloop_core::agent::{AgentState, RunResult, RunState, TraceEntry};
use taskloop_core::tool::ToolRegistry;
use taskloop_tools::{MemoryStore, default_registry};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::decomposer::{TaskDecomposer, TaskPlan};
use crate::executor::StepExecutor;
use crate::reasoning;

/// Bookkeeping about finished runs.
#[derive(Debug, Default)]
struct RunStats {
    last_trace_size: usize,
    runs_completed: u64,
}

/// The agent: a tool registry, a memory store and the loop that uses them.
///
/// One instance is meant to be shared (`Arc<Agent>`) by every caller.
/// Remembered facts and run statistics live as long as the instance.
pub struct Agent {
    executor: StepExecutor,
    decomposer: TaskDecomposer,
    memory: Arc<MemoryStore>,
    /// Iteration bound used by [`Agent::run_default`]
    max_iterations: usize,
    stats: RwLock<RunStats>,
}

impl Agent {
    /// Create an agent over an already-populated registry.
    ///
    /// `memory` should be the store the registry's `memory_store` tool
    /// writes to, so that [`Agent::state`] reports its size.
    pub fn new(tools: Arc<ToolRegistry>, memory: Arc<MemoryStore>) -> Self {
        Self {
            executor: StepExecutor::new(tools),
            decomposer: TaskDecomposer::new(),
            memory,
            max_iterations: 3,
            stats: RwLock::new(RunStats::default()),
        }
    }

    /// Build an agent with the built-in tools and a fresh memory store.
    ///
    /// Fails with [`Error::Config`] when `config` does not validate.
    pub fn from_config(config: &AppConfig) -> taskloop_core::Result<Self> {
        config.validate().map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        let memory = Arc::new(MemoryStore::new());
        let registry = default_registry(config, memory.clone())?;
        Ok(Self::new(Arc::new(registry), memory).with_max_iterations(config.agent.max_iterations))
    }

    /// Set the default iteration bound.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = clamp_iterations(max);
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.executor.tools()
    }

    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    /// Process a request with the default iteration bound.
    pub async fn run_default(&self, input: &str) -> RunResult {
        self.run(input, self.max_iterations).await
    }

    /// Process a request.
    ///
    /// Compound requests are decomposed and their sub-tasks run in order;
    /// anything else goes through a single bounded reasoning loop. Never
    /// fails: every problem is reported inside the returned result.
    pub async fn run(&self, input: &str, max_iterations: usize) -> RunResult {
        let run_id = Uuid::new_v4().to_string();
        let bound = clamp_iterations(max_iterations);
        info!(run_id = %run_id, max_iterations = bound, "Agent run starting");

        let plan = self.decomposer.decompose(input);
        let result = if plan.is_multi_step() {
            self.run_plan(run_id, input, plan, bound).await
        } else {
            self.run_single(run_id, input, bound).await
        };

        {
            let mut stats = self.stats.write().await;
            stats.last_trace_size = result.trace.len();
            stats.runs_completed += 1;
        }

        info!(
            run_id = %result.run_id,
            iterations = result.iteration_count,
            state = ?result.state,
            "Agent run finished"
        );
        result
    }

    /// Snapshot of the agent for health and state queries.
    pub async fn state(&self) -> AgentState {
        let memory_items = self.memory.len().await;
        let stats = self.stats.read().await;
        AgentState {
            registered_tools: self.tools().names().iter().map(|n| n.to_string()).collect(),
            memory_items,
            last_trace_size: stats.last_trace_size,
            runs_completed: stats.runs_completed,
        }
    }

    /// Think → act → observe until an action succeeds cleanly or the bound
    /// is reached.
    async fn run_single(&self, run_id: String, input: &str, bound: usize) -> RunResult {
        let mut trace: Vec<TraceEntry> = Vec::with_capacity(bound);
        let mut finished = false;

        for iteration in 1..=bound {
            let thought = match trace.last() {
                None => reasoning::initial_thought(input),
                Some(previous) => reasoning::follow_up_thought(&format!(
                    "Observation {}: {}",
                    previous.iteration,
                    previous.observation.render()
                )),
            };

            debug!(run_id = %run_id, iteration, "Thinking");
            let entry = self.executor.execute_step(&thought, iteration).await;
            finished = entry.action.is_some()
                && entry.observation.succeeded
                && !entry.observation.mentions_error();
            trace.push(entry);

            if finished {
                break;
            }
        }

        if !finished {
            warn!(run_id = %run_id, bound, "Iteration bound reached without a clean answer");
        }

        let (answer, state) = match trace.last() {
            Some(last) if last.observation.succeeded => (last.observation.render(), RunState::Completed),
            Some(last) => (last.observation.render(), RunState::Failed),
            None => (String::new(), RunState::Failed),
        };

        let tools_invoked = trace
            .iter()
            .filter_map(|entry| entry.action.as_ref().map(|a| a.render()))
            .collect();

        RunResult {
            run_id,
            input: input.to_string(),
            final_text: format!("ReAct Agent processed: {input}\n\nFinal Answer: {answer}"),
            state,
            iteration_count: trace.len(),
            trace,
            tools_invoked,
            plan: vec![input.to_string()],
            total_steps: 1,
            completed_steps: 1,
            step_results: Vec::new(),
        }
    }

    /// Run each sub-task through the single-step loop, stopping after the
    /// first one whose result reports an error or failure.
    async fn run_plan(&self, run_id: String, input: &str, plan: TaskPlan, bound: usize) -> RunResult {
        let total = plan.len();
        info!(run_id = %run_id, steps = total, "Multi-step task detected");

        let mut step_results: Vec<RunResult> = Vec::with_capacity(total);
        let mut halted = false;
        for (i, step) in plan.steps().iter().enumerate() {
            let n = i + 1;
            debug!(run_id = %run_id, step = n, total, task = %step, "Executing sub-task");
            let result = self.run_single(format!("{run_id}-{n}"), step, bound).await;
            halted = halts_plan(&result.final_text);
            step_results.push(result);

            if halted {
                warn!(run_id = %run_id, step = n, "Sub-task failed, stopping multi-step execution");
                break;
            }
        }

        let completed = step_results.len();
        let mut final_text = format!("Multi-Step Task Completed: {completed}/{total} steps executed\n");
        for (i, result) in step_results.iter().enumerate() {
            final_text.push_str(&format!("\nStep {}: {}", i + 1, result.final_text));
        }

        RunResult {
            run_id,
            input: input.to_string(),
            final_text,
            state: if halted { RunState::Failed } else { RunState::Completed },
            iteration_count: step_results.iter().map(|r| r.iteration_count).sum(),
            trace: step_results.iter().flat_map(|r| r.trace.iter().cloned()).collect(),
            tools_invoked: step_results
                .iter()
                .flat_map(|r| r.tools_invoked.iter().cloned())
                .collect(),
            plan: plan.into_steps(),
            total_steps: total,
            completed_steps: completed,
            step_results,
        }
    }
}

fn clamp_iterations(max: usize) -> usize {
    max.clamp(1, MAX_ITERATIONS_LIMIT)
}

/// A sub-task result that mentions an error or failure stops the plan.
fn halts_plan(final_text: &str) -> bool {
    let lower = final_text.to_lowercase();
    lower.contains("error") || lower.contains("failed")
}
