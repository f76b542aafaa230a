//! Transcript: the Thought/Action/Observation log of a single run.
//!
//! The transcript is:
//!
//! - **Append-only**: steps can be pushed but never removed or edited
//! - **Run-scoped**: created empty at run start, handed back in the report
//! - **Renderable**: produces a text trace for display
//! - **Serializable**: can be exported to JSON for debugging

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One reasoning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Free-text rationale from the backend.
    Thought { text: String },
    /// A tool invocation request.
    Action {
        tool: String,
        arguments: serde_json::Value,
    },
    /// The tool result or error text.
    Observation { output: String, success: bool },
}

/// A step with the time it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(flatten)]
    pub step: Step,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_thought(&mut self, text: &str) {
        self.push(Step::Thought {
            text: text.to_string(),
        });
    }

    pub fn add_action(&mut self, tool: &str, arguments: &serde_json::Value) {
        self.push(Step::Action {
            tool: tool.to_string(),
            arguments: arguments.clone(),
        });
    }

    pub fn add_observation(&mut self, output: &str, success: bool) {
        self.push(Step::Observation {
            output: output.to_string(),
            success,
        });
    }

    fn push(&mut self, step: Step) {
        self.entries.push(TranscriptEntry {
            step,
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.entries.iter().map(|e| &e.step)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of Action steps recorded so far.
    pub fn action_count(&self) -> usize {
        self.steps()
            .filter(|s| matches!(s, Step::Action { .. }))
            .count()
    }

    /// Render the transcript as a human-readable trace.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match &entry.step {
                Step::Thought { text } => {
                    out.push_str(&format!("[Thought] {}\n", text));
                }
                Step::Action { tool, arguments } => {
                    out.push_str(&format!("[Action] {}({})\n", tool, arguments));
                }
                Step::Observation { output, success } => {
                    let marker = if *success { "✓" } else { "✗" };
                    out.push_str(&format!("[Observation {}] {}\n", marker, output));
                }
            }
        }
        out
    }
}
