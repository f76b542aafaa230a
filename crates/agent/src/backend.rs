//! Provider-backed reasoner.
//!
//! Turns the run so far into a chat-completions request and the model's
//! reply into one [`Decision`]. The transcript is replayed on every call
//! as assistant tool-call messages followed by tool-result messages, so the
//! provider can stay stateless.

use agentdir_core::error::BackendError;
use agentdir_core::message::{Message, MessageToolCall};
use agentdir_core::provider::{Provider, ProviderRequest, ToolDefinition};
use agentdir_core::reasoner::{Decision, Reasoner};
use agentdir_core::transcript::{Step, Transcript};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Instruction used when the configuration does not override it.
pub const DEFAULT_INSTRUCTION: &str =
    "Organize files with categories documented by managing file operations.";

/// Name of the virtual tool the model calls to end the run.
pub const FINISH_TOOL: &str = "finish";

const TOOL_RULES: &str = "\
Rules:
- Act only through the provided tools, one tool call per reply.
- Paths are relative to the working directory unless they are absolute.
- Look at the directory with list_dir before moving or removing anything.
- If a tool reports an error, adjust your next call instead of repeating it.
- When the task is complete, call `finish` with a short summary of what you did.";

pub struct ProviderReasoner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    instruction: String,
}

impl ProviderReasoner {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Replace the leading instruction. The tool-use rules are always kept.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> String {
        format!("{}\n\n{}", self.instruction.trim(), TOOL_RULES)
    }

    /// System prompt, the task, then the transcript replayed as messages.
    fn build_messages(&self, task: &str, transcript: &Transcript) -> Vec<Message> {
        let mut messages = vec![Message::system(self.system_prompt()), Message::user(task)];

        let mut pending_thought: Option<&str> = None;
        let mut call_seq = 0u32;

        for step in transcript.steps() {
            match step {
                Step::Thought { text } => {
                    if let Some(earlier) = pending_thought.replace(text.as_str()) {
                        messages.push(Message::assistant(earlier));
                    }
                }
                Step::Action { tool, arguments } => {
                    call_seq += 1;
                    let mut msg = Message::assistant(pending_thought.take().unwrap_or_default());
                    msg.tool_calls = vec![MessageToolCall {
                        id: format!("call_{call_seq}"),
                        name: tool.clone(),
                        arguments: arguments.to_string(),
                    }];
                    messages.push(msg);
                }
                Step::Observation { output, success } => {
                    let content = if *success {
                        output.clone()
                    } else {
                        format!("Error: {output}")
                    };
                    messages.push(Message::tool_result(format!("call_{call_seq}"), content));
                }
            }
        }

        if let Some(thought) = pending_thought {
            messages.push(Message::assistant(thought));
        }

        messages
    }
}

fn finish_definition() -> ToolDefinition {
    ToolDefinition {
        name: FINISH_TOOL.to_string(),
        description: "Finish the task and report the result to the user.".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "result": {
                    "type": "string",
                    "description": "Summary of what was done",
                }
            },
            "required": ["result"],
        }),
    }
}

fn parse_arguments(call: &MessageToolCall) -> Result<serde_json::Value, BackendError> {
    if call.arguments.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(&call.arguments).map_err(|e| {
        BackendError::Unparsable(format!("invalid JSON arguments for '{}': {e}", call.name))
    })
}

#[async_trait]
impl Reasoner for ProviderReasoner {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn decide(
        &self,
        task: &str,
        transcript: &Transcript,
        tools: &[ToolDefinition],
    ) -> Result<Decision, BackendError> {
        let mut definitions = tools.to_vec();
        definitions.push(finish_definition());

        let request = ProviderRequest {
            model: self.model.clone(),
            messages: self.build_messages(task, transcript),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: definitions,
        };

        let response = self.provider.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                tokens = usage.total_tokens,
                "Backend replied"
            );
        }

        let thought = response.message.content.trim().to_string();
        let mut calls = response.message.tool_calls.into_iter();

        let Some(call) = calls.next() else {
            if thought.is_empty() {
                return Err(BackendError::Unparsable(
                    "reply had neither text nor a tool call".into(),
                ));
            }
            return Ok(Decision::Finish {
                message: thought.clone(),
                thought,
            });
        };

        let dropped = calls.len();
        if dropped > 0 {
            warn!(tool = %call.name, dropped, "Backend requested several tool calls; using the first");
        }

        let arguments = parse_arguments(&call)?;

        if call.name == FINISH_TOOL {
            let message = arguments["result"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| thought.clone());
            return Ok(Decision::Finish { message, thought });
        }

        Ok(Decision::Act {
            tool: call.name,
            arguments,
            thought,
        })
    }
}
