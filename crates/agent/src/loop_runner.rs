//! The agent reasoning loop implementation.

use agentdir_core::error::{BackendError, Error, ToolError};
use agentdir_core::reasoner::{Decision, Reasoner, RunResult};
use agentdir_core::tool::ToolRegistry;
use agentdir_core::transcript::Transcript;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything a finished run hands back to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub result: RunResult,
    /// Complete Thought/Action/Observation trace.
    pub transcript: Transcript,
    /// Number of tool-executing iterations.
    pub iterations: u32,
    /// Total tool calls attempted, including rejected ones.
    pub tool_calls: u32,
}

/// Drives one reasoner against one tool registry until it finishes, runs
/// out of iterations, or fails.
pub struct AgentLoop {
    reasoner: Arc<dyn Reasoner>,

    tools: Arc<ToolRegistry>,

    /// Maximum tool-executing iterations per run
    max_iterations: u32,

    /// Upper bound on a single decide call
    timeout: Duration,
}

impl AgentLoop {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 20;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(reasoner: Arc<dyn Reasoner>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            reasoner,
            tools,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// A loop over the filesystem tools bound to `dir`.
    ///
    /// The directory must already exist.
    pub fn for_directory(
        reasoner: Arc<dyn Reasoner>,
        dir: impl Into<PathBuf>,
    ) -> Result<Self, Error> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::WorkingDirectory(format!(
                "'{}' is not a directory",
                dir.display()
            )));
        }
        let tools = agentdir_tools::default_registry(dir)?;
        Ok(Self::new(reasoner, Arc::new(tools)))
    }

    /// Set the maximum number of iterations. Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set the per-decision backend timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run `task` to a terminal state.
    ///
    /// Always returns a report; faults end up in `RunResult::Failed`.
    pub async fn run(&self, task: &str, cancel: &CancellationToken) -> RunReport {
        let definitions = self.tools.describe();
        let mut transcript = Transcript::new();
        let mut iterations = 0u32;
        let mut tool_calls = 0u32;
        let started = Instant::now();

        info!(
            reasoner = self.reasoner.name(),
            tools = definitions.len(),
            max_iterations = self.max_iterations,
            "Starting run"
        );

        let result = loop {
            if cancel.is_cancelled() {
                break cancelled();
            }
            if iterations >= self.max_iterations {
                warn!(iterations, "Max iterations reached without a final answer");
                break RunResult::Exhausted { iterations };
            }

            debug!(iteration = iterations + 1, "Agent loop iteration");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                decided = tokio::time::timeout(
                    self.timeout,
                    self.reasoner.decide(task, &transcript, &definitions),
                ) => Some(decided),
            };

            let decision = match outcome {
                None => break cancelled(),
                Some(Ok(Ok(decision))) => decision,
                Some(Ok(Err(err))) => {
                    warn!(error = %err, "Backend failed");
                    break RunResult::Failed(err.to_string());
                }
                Some(Err(_elapsed)) => {
                    let err = BackendError::Timeout {
                        secs: self.timeout.as_secs(),
                    };
                    warn!(error = %err, "Backend timed out");
                    break RunResult::Failed(err.to_string());
                }
            };

            match decision {
                Decision::Finish { message, thought } => {
                    transcript.add_thought(&thought);
                    break RunResult::Completed(message);
                }
                Decision::Act {
                    tool,
                    arguments,
                    thought,
                } => {
                    transcript.add_thought(&thought);
                    transcript.add_action(&tool, &arguments);
                    tool_calls += 1;

                    let call_started = Instant::now();
                    let invoked = self.tools.invoke(&tool, arguments).await;
                    let duration_ms = millis(call_started.elapsed());
                    iterations += 1;

                    match invoked {
                        Ok(result) => {
                            debug!(
                                tool = %tool,
                                success = result.success,
                                duration_ms,
                                "Tool executed"
                            );
                            transcript.add_observation(&result.output, result.success);
                        }
                        Err(err) if err.is_recoverable() => {
                            warn!(tool = %tool, error = %err, "Tool call rejected");
                            transcript.add_observation(&err.to_string(), false);
                        }
                        Err(err) => {
                            transcript.add_observation(&err.to_string(), false);
                            break fatal_tool_fault(err);
                        }
                    }
                }
            }
        };

        info!(
            success = result.is_success(),
            iterations,
            tool_calls,
            elapsed_ms = millis(started.elapsed()),
            "Run finished"
        );

        RunReport {
            result,
            transcript,
            iterations,
            tool_calls,
        }
    }
}

fn cancelled() -> RunResult {
    info!("Run cancelled");
    RunResult::Failed("run cancelled".into())
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn fatal_tool_fault(err: ToolError) -> RunResult {
    warn!(error = %err, "Tool faulted, aborting run");
    RunResult::Failed(err.to_string())
}
