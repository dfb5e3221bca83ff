//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the assistant the ability to act: look up reference
//! documents, run AWS CLI commands, generate and execute diagram code, and
//! hand back a final answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::error::ToolError;

/// Execution category of a tool. The reasoning loop dispatches by lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    DocumentLookup,
    CommandExecution,
    CodeGeneration,
    CodeExecution,
    /// Invoking a tool in this lane ends the session with its input as the answer.
    FinalResponse,
    General,
}

impl Lane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentLookup => "document_lookup",
            Self::CommandExecution => "command_execution",
            Self::CodeGeneration => "code_generation",
            Self::CodeExecution => "code_execution",
            Self::FinalResponse => "final_response",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// A successful result carrying a structured payload.
    pub fn json(data: serde_json::Value) -> Self {
        Self {
            success: true,
            output: data.to_string(),
            data: Some(data),
        }
    }

    /// A failed result carrying a structured payload.
    pub fn failed_json(data: serde_json::Value) -> Self {
        Self {
            success: false,
            output: data.to_string(),
            data: Some(data),
        }
    }

    /// The observation payload: structured data when present, else the text.
    pub fn content(&self) -> serde_json::Value {
        self.data
            .clone()
            .unwrap_or_else(|| serde_json::Value::String(self.output.clone()))
    }
}

/// The core Tool trait.
///
/// Each capability implements this trait. Tools are registered in the
/// ToolRegistry and made available to the reasoning loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool, exactly as the model must write it.
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    fn lane(&self) -> Lane {
        Lane::General
    }

    /// Execute the tool with the given arguments.
    ///
    /// Arguments are either a bare JSON string (free-text input) or an object.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError>;
}

/// Pull a free-text argument out of a tool input.
///
/// Accepts a bare string or an object carrying `key` as a string field.
pub fn text_argument(
    arguments: &serde_json::Value,
    key: &str,
) -> std::result::Result<String, ToolError> {
    match arguments {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Object(map) => map
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ToolError::InvalidArguments(format!("missing string field '{key}'"))),
        other => Err(ToolError::InvalidArguments(format!(
            "expected a string or an object with '{key}', got {other}"
        ))),
    }
}

/// A registry of available tools, keyed by unique name.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Build a registry, rejecting duplicate names.
    pub fn from_tools(
        tools: impl IntoIterator<Item = Box<dyn Tool>>,
    ) -> std::result::Result<Self, ToolError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool. A second tool with the same name is a configuration error.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Lane of a registered tool; unknown names fall into `General`.
    pub fn lane_of(&self, name: &str) -> Lane {
        self.get(name).map(|t| t.lane()).unwrap_or(Lane::General)
    }

    /// All registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// `name: description` lines for prompting, sorted by name.
    pub fn describe(&self) -> String {
        self.names()
            .into_iter()
            .filter_map(|n| self.get(n))
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            let text = text_argument(&arguments, "text")?;
            Ok(ToolResult {
                success: true,
                output: text,
                data: None,
            })
        }
    }

    struct AnswerTool;

    #[async_trait]
    impl Tool for AnswerTool {
        fn name(&self) -> &str { "answer" }
        fn description(&self) -> &str { "Final answer" }
        fn parameters_schema(&self) -> serde_json::Value { serde_json::json!({"type": "string"}) }
        fn lane(&self) -> Lane { Lane::FinalResponse }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            Ok(ToolResult::json(arguments))
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        let err = registry.register(Box::new(EchoTool)).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateName(ref n) if n == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn from_tools_propagates_duplicates() {
        let result = ToolRegistry::from_tools(vec![
            Box::new(EchoTool) as Box<dyn Tool>,
            Box::new(EchoTool),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn lanes_resolve_per_tool() {
        let registry =
            ToolRegistry::from_tools(vec![
                Box::new(EchoTool) as Box<dyn Tool>,
                Box::new(AnswerTool),
            ])
                .unwrap();
        assert_eq!(registry.lane_of("echo"), Lane::General);
        assert_eq!(registry.lane_of("answer"), Lane::FinalResponse);
        assert_eq!(registry.lane_of("missing"), Lane::General);
    }

    #[test]
    fn describe_lists_sorted_tools() {
        let registry =
            ToolRegistry::from_tools(vec![
                Box::new(EchoTool) as Box<dyn Tool>,
                Box::new(AnswerTool),
            ])
                .unwrap();
        assert_eq!(registry.names(), vec!["answer", "echo"]);
        assert_eq!(registry.describe(), "answer: Final answer\necho: Echoes back the input");
    }

    #[tokio::test]
    async fn registered_tool_executes_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        let tool = registry.get("echo").unwrap();

        let result = tool
            .execute(serde_json::json!({"text": "hello world"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hello world");

        let result = tool.execute(serde_json::json!("bare")).await.unwrap();
        assert_eq!(result.output, "bare");
    }

    #[test]
    fn unknown_tool_is_absent() {
        let registry = ToolRegistry::new();
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.lane_of("nonexistent"), Lane::General);
    }

    #[test]
    fn text_argument_rejects_other_shapes() {
        assert!(text_argument(&serde_json::json!(42), "query").is_err());
        assert!(text_argument(&serde_json::json!({"q": "x"}), "query").is_err());
        assert_eq!(text_argument(&serde_json::json!({"query": "x"}), "query").unwrap(), "x");
    }

    #[test]
    fn tool_result_content_prefers_data() {
        let r = ToolResult::json(serde_json::json!({"docs": []}));
        assert_eq!(r.content(), serde_json::json!({"docs": []}));
        let r = ToolResult { success: true, output: "plain".into(), data: None };
        assert_eq!(r.content(), serde_json::json!("plain"));
    }
}
