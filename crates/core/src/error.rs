//! Error types for the agentdir domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! wraps them for callers that do not care which layer failed.

use thiserror::Error;

/// The top-level error type for all agentdir operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Working directory error: {0}")]
    WorkingDirectory(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to an LLM endpoint.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Failures of the reasoning backend adapter. Always fatal to a run.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("unparsable backend response: {0}")]
    Unparsable(String),

    #[error("backend timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("backend rejected the request: {0}")]
    Provider(ProviderError),
}

impl From<ProviderError> for BackendError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Network(reason) | ProviderError::Timeout(reason) => {
                BackendError::Unreachable(reason)
            }
            ProviderError::InvalidResponse(reason) => BackendError::Unparsable(reason),
            other => BackendError::Provider(other),
        }
    }
}

/// Coarse classification attached to a failed [`crate::tool::ToolResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    UnknownTool,
    InvalidArguments,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    Io,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid arguments for '{tool_name}': {}", fields.join(", "))]
    InvalidArguments {
        tool_name: String,
        fields: Vec<String>,
    },

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Permission denied: {tool_name}: {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Tool '{tool_name}' faulted: {reason}")]
    Internal { tool_name: String, reason: String },
}

impl ToolError {
    /// Whether the agent loop may feed this error back to the model.
    ///
    /// Only internal faults abort a run.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ToolError::Internal { .. })
    }

    pub fn kind(&self) -> ToolErrorKind {
        match self {
            ToolError::NotFound(_) => ToolErrorKind::UnknownTool,
            ToolError::InvalidArguments { .. } => ToolErrorKind::InvalidArguments,
            ToolError::PermissionDenied { .. } => ToolErrorKind::PermissionDenied,
            ToolError::DuplicateTool(_)
            | ToolError::ExecutionFailed { .. }
            | ToolError::Internal { .. } => ToolErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn network_faults_map_to_unreachable() {
        let err: BackendError = ProviderError::Network("connection refused".into()).into();
        assert!(matches!(err, BackendError::Unreachable(_)));
        assert!(err.to_string().starts_with("backend unreachable"));

        let err: BackendError = ProviderError::AuthenticationFailed("bad key".into()).into();
        assert!(matches!(err, BackendError::Provider(_)));
    }

    #[test]
    fn invalid_responses_map_to_unparsable() {
        let err: BackendError = ProviderError::InvalidResponse("no choices".into()).into();
        assert!(matches!(err, BackendError::Unparsable(_)));
        assert_eq!(err.to_string(), "unparsable backend response: no choices");
    }

    #[test]
    fn invalid_arguments_lists_fields() {
        let err = ToolError::InvalidArguments {
            tool_name: "rename".into(),
            fields: vec!["old (missing)".into(), "new (expected string)".into()],
        };
        let text = err.to_string();
        assert!(text.contains("rename"));
        assert!(text.contains("old (missing)"));
        assert!(text.contains("new (expected string)"));
    }

    #[test]
    fn only_internal_faults_are_fatal() {
        assert!(ToolError::NotFound("x".into()).is_recoverable());
        assert!(
            !ToolError::Internal {
                tool_name: "x".into(),
                reason: "panic".into()
            }
            .is_recoverable()
        );
    }
}
