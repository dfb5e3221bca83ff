//! Python interpreter tool — runs model-written Python, usually diagram code.
//!
//! Not sandboxed. See [`crate::executor::PythonInterpreter`].

use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::error::ToolError;
use stratus_core::executor::CodeInterpreter;
use stratus_core::tool::{Lane, Tool, ToolResult, text_argument};
use tracing::warn;

pub const NAME: &str = "python_interpreter_tool";

/// Remove a surrounding markdown code fence, if there is one.
///
/// Handles both ```` ```python ```` and bare ```` ``` ```` openers. Text
/// without a leading fence is only trimmed.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the info string on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => "",
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim().to_string()
}

pub struct PythonInterpreterTool {
    interpreter: Arc<dyn CodeInterpreter>,
}

impl PythonInterpreterTool {
    pub fn new(interpreter: Arc<dyn CodeInterpreter>) -> Self {
        Self { interpreter }
    }
}

#[async_trait]
impl Tool for PythonInterpreterTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Runs Python code and returns what it prints. Use it to execute diagram code from \
         aws_cloud_diagram_code_tool. Input must be valid Python source."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "code": { "type": "string", "description": "Python source to run" }
            },
            "required": ["code"]
        })
    }

    fn lane(&self) -> Lane {
        Lane::CodeExecution
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let source = strip_code_fences(&text_argument(&arguments, "code")?);
        if source.is_empty() {
            return Err(ToolError::InvalidArguments("no Python source given".into()));
        }

        match self.interpreter.run(&source).await {
            Ok(output) => Ok(ToolResult::json(serde_json::json!({ "output": output }))),
            Err(e) => {
                warn!(error = %e, "Python execution failed");
                Ok(ToolResult::failed_json(serde_json::json!({ "error": e.to_string() })))
            }
        }
    }
}
