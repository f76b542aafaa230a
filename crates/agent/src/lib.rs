//! The agent loop for agentdir.
//!
//! The loop follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Ask** the reasoner for the next decision, given the task and the
//!    transcript so far
//! 2. **Act**: run the chosen filesystem tool and record its result
//! 3. **Observe**: feed the result back on the next iteration
//!
//! The run ends when the reasoner finishes, the iteration bound is hit,
//! or the backend fails. [`ProviderReasoner`] adapts any LLM
//! [`agentdir_core::Provider`] to the [`agentdir_core::Reasoner`] seam.

pub mod backend;
pub mod loop_runner;

#[cfg(test)]
mod test_helpers;

pub use backend::{DEFAULT_INSTRUCTION, FINISH_TOOL, ProviderReasoner};
pub use loop_runner::{AgentLoop, RunReport};
pub use tokio_util::sync::CancellationToken;
