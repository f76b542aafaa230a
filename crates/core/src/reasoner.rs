//! Reasoner trait: the per-iteration decision boundary of the agent loop.
//!
//! A reasoner looks at the task, the transcript so far, and the available
//! tools, and decides on exactly one next move. It never mutates the
//! transcript; the loop records whatever it returns.

use crate::error::BackendError;
use crate::provider::ToolDefinition;
use crate::transcript::Transcript;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One decision from the reasoning backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Invoke a tool.
    Act {
        tool: String,
        arguments: serde_json::Value,
        thought: String,
    },
    /// Stop and report.
    Finish { message: String, thought: String },
}

#[async_trait]
pub trait Reasoner: Send + Sync {
    fn name(&self) -> &str;

    async fn decide(
        &self,
        task: &str,
        transcript: &Transcript,
        tools: &[ToolDefinition],
    ) -> Result<Decision, BackendError>;
}

/// Terminal status of one agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RunResult {
    /// The backend finished with a message.
    Completed(String),
    /// The iteration bound was hit before the backend finished.
    Exhausted { iterations: u32 },
    /// The run was aborted.
    Failed(String),
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Completed(_))
    }

    /// Text to show the user. Never empty.
    pub fn message(&self) -> String {
        match self {
            RunResult::Completed(msg) if msg.trim().is_empty() => {
                "Task completed (the agent returned no message)".to_string()
            }
            RunResult::Completed(msg) => msg.clone(),
            RunResult::Exhausted { iterations } => format!(
                "Iteration limit reached after {iterations} iterations without a final answer"
            ),
            RunResult::Failed(reason) => format!("Run failed: {reason}"),
        }
    }
}

impl std::fmt::Display for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_result_messages_are_never_blank() {
        assert_eq!(
            RunResult::Completed("Created reports folder".into()).message(),
            "Created reports folder"
        );
        assert!(!RunResult::Completed("  ".into()).message().trim().is_empty());
        assert!(
            RunResult::Exhausted { iterations: 20 }
                .message()
                .contains("Iteration limit reached")
        );
        assert!(
            RunResult::Failed("backend unreachable: refused".into())
                .to_string()
                .contains("backend unreachable")
        );
    }

    #[test]
    fn only_completed_is_success() {
        assert!(RunResult::Completed("done".into()).is_success());
        assert!(!RunResult::Exhausted { iterations: 1 }.is_success());
        assert!(!RunResult::Failed("x".into()).is_success());
    }

    #[test]
    fn decision_serializes_with_tag() {
        let d = Decision::Finish {
            message: "done".into(),
            thought: "all files moved".into(),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["decision"], "finish");
    }
}
