//! Shared test doubles for the agent crate.

use agentdir_core::error::{BackendError, ProviderError};
use agentdir_core::message::{Message, MessageToolCall};
use agentdir_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
use agentdir_core::reasoner::{Decision, Reasoner};
use agentdir_core::transcript::Transcript;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses and
/// records every request it receives.
///
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![Ok(make_text_response(text))])
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        responses
            .pop_front()
            .unwrap_or_else(|| panic!("SequentialMockProvider: no more responses"))
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    make_tool_call_response(vec![], text)
}

pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    let mut msg = Message::assistant(thought);
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// A reasoner that replays scripted decisions, then repeats `fallback`
/// (if any) once the script runs out.
pub struct ScriptedReasoner {
    script: Mutex<VecDeque<Result<Decision, BackendError>>>,
    fallback: Option<Decision>,
    calls: Mutex<u32>,
}

impl ScriptedReasoner {
    pub fn new(script: Vec<Result<Decision, BackendError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            calls: Mutex::new(0),
        }
    }

    /// A reasoner that never finishes.
    pub fn repeating(decision: Decision) -> Self {
        Self {
            fallback: Some(decision),
            ..Self::new(vec![])
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Reasoner for ScriptedReasoner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn decide(
        &self,
        _task: &str,
        _transcript: &Transcript,
        _tools: &[ToolDefinition],
    ) -> Result<Decision, BackendError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or_else(|| BackendError::Unparsable("script exhausted".into()))
    }
}

/// A reasoner whose decide call never completes.
pub struct HangingReasoner;

#[async_trait::async_trait]
impl Reasoner for HangingReasoner {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn decide(
        &self,
        _task: &str,
        _transcript: &Transcript,
        _tools: &[ToolDefinition],
    ) -> Result<Decision, BackendError> {
        std::future::pending().await
    }
}

pub fn act(tool: &str, arguments: serde_json::Value) -> Decision {
    Decision::Act {
        tool: tool.to_string(),
        arguments,
        thought: format!("calling {tool}"),
    }
}

pub fn finish(message: &str) -> Decision {
    Decision::Finish {
        message: message.to_string(),
        thought: "done".to_string(),
    }
}
