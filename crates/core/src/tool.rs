//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act on the working
//! directory. Each tool declares an ordered parameter list; the
//! [`ToolRegistry`] validates arguments against it before dispatch and
//! guarantees the caller always gets a [`ToolResult`] back for anything the
//! tool itself reports.

use crate::error::{ToolError, ToolErrorKind};
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

/// JSON shape a parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Boolean,
}

impl ParamType {
    /// The JSON Schema type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
        }
    }

    fn accepts(&self, value: &serde_json::Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Boolean => value.is_boolean(),
        }
    }
}

/// One entry of a tool's ordered parameter list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
    pub required: bool,
    /// Value substituted when an optional parameter is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    pub description: String,
}

impl ParamSpec {
    /// A required parameter.
    pub fn required(name: &str, kind: ParamType, description: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            description: description.into(),
        }
    }

    /// An optional parameter with a default value.
    pub fn optional(
        name: &str,
        kind: ParamType,
        default: serde_json::Value,
        description: &str,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: Some(default),
            description: description.into(),
        }
    }
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content, shown to the model as the observation
    pub output: String,

    /// Failure classification; `None` on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ToolErrorKind>,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error_kind: None,
            data: None,
        }
    }

    pub fn failure(kind: ToolErrorKind, output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error_kind: Some(kind),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// The core Tool trait.
///
/// Implementations receive arguments that have already been validated
/// against [`Tool::params`], with defaults filled in.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "create_dir").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// Ordered parameter list.
    fn params(&self) -> Vec<ParamSpec>;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError>;

    /// JSON Schema derived from [`Tool::params`].
    fn parameters_schema(&self) -> serde_json::Value {
        let params = self.params();
        let mut properties = serde_json::Map::new();
        for p in &params {
            let mut prop = serde_json::json!({
                "type": p.kind.as_str(),
                "description": p.description,
            });
            if let Some(default) = &p.default {
                prop["default"] = default.clone();
            }
            properties.insert(p.name.clone(), prop);
        }
        let required: Vec<&str> = params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// Populated once at startup, then shared read-only. The agent loop uses it
/// to describe tools to the backend and to invoke them by name.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Fails if a tool with the same name exists.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// Tool definitions in registration order.
    pub fn describe(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate `arguments` and run the named tool.
    ///
    /// Returns `Err` only for an unknown name, invalid arguments, or a
    /// panic inside the tool. Errors the tool reports itself come back as
    /// a failed [`ToolResult`].
    pub async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        let arguments = validate_arguments(name, &tool.params(), arguments)?;

        debug!(tool = name, %arguments, "Invoking tool");

        match AssertUnwindSafe(tool.execute(arguments)).catch_unwind().await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) if err.is_recoverable() => {
                Ok(ToolResult::failure(err.kind(), err.to_string()))
            }
            Ok(Err(err)) => Err(err),
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                warn!(tool = name, %reason, "Tool panicked");
                Err(ToolError::Internal {
                    tool_name: name.to_string(),
                    reason,
                })
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check `arguments` against `params`, filling defaults for omitted
/// optional fields. Unknown fields are passed through untouched.
fn validate_arguments(
    tool_name: &str,
    params: &[ParamSpec],
    arguments: serde_json::Value,
) -> Result<serde_json::Value, ToolError> {
    let mut map = match arguments {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        _ => {
            return Err(ToolError::InvalidArguments {
                tool_name: tool_name.to_string(),
                fields: vec!["arguments (expected object)".into()],
            });
        }
    };

    let mut offending = Vec::new();
    for p in params {
        match map.get(&p.name) {
            Some(v) if p.kind.accepts(v) => {}
            Some(serde_json::Value::Null) if !p.required => {
                if let Some(default) = &p.default {
                    map.insert(p.name.clone(), default.clone());
                }
            }
            Some(_) => offending.push(format!("{} (expected {})", p.name, p.kind.as_str())),
            None if p.required => offending.push(format!("{} (missing)", p.name)),
            None => {
                if let Some(default) = &p.default {
                    map.insert(p.name.clone(), default.clone());
                }
            }
        }
    }

    if offending.is_empty() {
        Ok(serde_json::Value::Object(map))
    } else {
        Err(ToolError::InvalidArguments {
            tool_name: tool_name.to_string(),
            fields: offending,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn params(&self) -> Vec<ParamSpec> {
            vec![
                ParamSpec::required("text", ParamType::String, "Text to echo"),
                ParamSpec::optional(
                    "shout",
                    ParamType::Boolean,
                    serde_json::json!(false),
                    "Upper-case the output",
                ),
            ]
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("").to_string();
            if arguments["shout"].as_bool() == Some(true) {
                return Ok(ToolResult::success(text.to_uppercase()));
            }
            Ok(ToolResult::success(text))
        }
    }

    /// Fails every call through the error channel.
    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn params(&self) -> Vec<ParamSpec> {
            vec![]
        }
        async fn execute(
            &self,
            _arguments: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "failing".into(),
                reason: "disk on fire".into(),
            })
        }
    }

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn name(&self) -> &str {
            "panicking"
        }
        fn description(&self) -> &str {
            "Panics"
        }
        fn params(&self) -> Vec<ParamSpec> {
            vec![]
        }
        async fn execute(
            &self,
            _arguments: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            panic!("boom")
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        registry.register(Box::new(FailingTool)).unwrap();
        registry.register(Box::new(PanickingTool)).unwrap();
        registry
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = registry();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.names(), vec!["echo", "failing", "panicking"]);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        let err = registry.register(Box::new(EchoTool)).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn describe_builds_schema_from_params() {
        let registry = registry();
        let defs = registry.describe();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[0].name, "echo");
        assert_eq!(defs[0].parameters["required"], serde_json::json!(["text"]));
        assert_eq!(defs[0].parameters["properties"]["shout"]["type"], "boolean");
        assert_eq!(defs[0].parameters["properties"]["shout"]["default"], false);
    }

    #[tokio::test]
    async fn invoke_runs_tool() {
        let result = registry()
            .invoke("echo", serde_json::json!({"text": "hello world"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hello world");
    }

    #[tokio::test]
    async fn invoke_fills_defaults() {
        let result = registry()
            .invoke("echo", serde_json::json!({"text": "hi", "shout": null}))
            .await
            .unwrap();
        assert_eq!(result.output, "hi");
    }

    #[tokio::test]
    async fn unknown_tool_is_reported() {
        for name in ["", "nonexistent", "create_dir", "ECHO"] {
            let err = registry()
                .invoke(name, serde_json::json!({}))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn missing_and_mistyped_fields_are_listed() {
        let err = registry()
            .invoke("echo", serde_json::json!({"shout": "yes"}))
            .await
            .unwrap_err();
        match err {
            ToolError::InvalidArguments { tool_name, fields } => {
                assert_eq!(tool_name, "echo");
                assert_eq!(fields, vec!["text (missing)", "shout (expected boolean)"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_object_arguments_rejected() {
        let err = registry()
            .invoke("echo", serde_json::json!(["hello"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn tool_errors_become_failed_results() {
        let result = registry()
            .invoke("failing", serde_json::Value::Null)
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("disk on fire"));
        assert_eq!(result.error_kind, Some(ToolErrorKind::Io));
    }

    #[tokio::test]
    async fn panics_are_caught_at_the_boundary() {
        let err = registry()
            .invoke("panicking", serde_json::json!({}))
            .await
            .unwrap_err();
        match err {
            ToolError::Internal { tool_name, reason } => {
                assert_eq!(tool_name, "panicking");
                assert_eq!(reason, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
