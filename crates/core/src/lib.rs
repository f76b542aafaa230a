//! # agentdir core
//!
//! Domain types, traits, and error definitions for the agentdir file
//! organization agent. This crate has no I/O of its own: it defines the
//! model that the provider, tool, and agent crates implement against.
//!
//! Every seam is a trait here:
//! - [`Provider`] talks to an LLM endpoint
//! - [`Reasoner`] turns a transcript into the next [`Decision`]
//! - [`Tool`] performs one named operation, looked up via [`ToolRegistry`]

pub mod error;
pub mod message;
pub mod provider;
pub mod reasoner;
pub mod tool;
pub mod transcript;

// Re-export key types at crate root for ergonomics
pub use error::{BackendError, Error, ProviderError, Result, ToolError, ToolErrorKind};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use reasoner::{Decision, Reasoner, RunResult};
pub use tool::{ParamSpec, ParamType, Tool, ToolRegistry, ToolResult};
pub use transcript::{Step, Transcript, TranscriptEntry};
