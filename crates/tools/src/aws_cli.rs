//! AWS CLI tool — run `aws ...` commands on behalf of the model.
//!
//! The command text is repaired for unbalanced quotes, run through a
//! [`CommandExecutor`], and the output classified into success or error.
//! Both heuristics are best effort: escaped or nested quotes are not
//! understood, and successful output that happens to contain the word
//! "error" is reported as a failure.

use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::error::ToolError;
use stratus_core::executor::CommandExecutor;
use stratus_core::tool::{Lane, Tool, ToolResult, text_argument};
use tracing::debug;

pub const NAME: &str = "aws_cli_tool";

/// Append a closing quote for each quote kind that occurs an odd number of times.
///
/// Single quote first, then double. Applying it twice changes nothing.
pub fn ensure_quotes_balanced(command: &str) -> String {
    let mut balanced = command.to_string();
    if command.matches('\'').count() % 2 == 1 {
        balanced.push('\'');
    }
    if command.matches('"').count() % 2 == 1 {
        balanced.push('"');
    }
    balanced
}

/// Classify raw command output.
///
/// - contains `error` → failure carrying the command and output
/// - parses as JSON → `{"success": <json>}`
/// - otherwise → `{"success": "<text>"}`
pub fn classify_output(command: &str, output: &str) -> ToolResult {
    if output.contains("error") {
        return ToolResult::failed_json(serde_json::json!({
            "command": command,
            "error": output,
        }));
    }
    match serde_json::from_str::<serde_json::Value>(output) {
        Ok(parsed) => ToolResult::json(serde_json::json!({ "success": parsed })),
        Err(_) => ToolResult::json(serde_json::json!({ "success": output })),
    }
}

pub struct AwsCliTool {
    executor: Arc<dyn CommandExecutor>,
    /// If non-empty, commands must start with one of these words.
    allowed_commands: Vec<String>,
}

impl AwsCliTool {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            allowed_commands: Vec::new(),
        }
    }

    pub fn with_allowlist(mut self, allowed_commands: Vec<String>) -> Self {
        self.allowed_commands = allowed_commands;
        self
    }

    fn is_command_allowed(&self, command: &str) -> bool {
        if self.allowed_commands.is_empty() {
            return true;
        }
        let base_cmd = command.split_whitespace().next().unwrap_or("");
        self.allowed_commands.iter().any(|a| a == base_cmd)
    }
}

#[async_trait]
impl Tool for AwsCliTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Runs an AWS CLI command against the configured account and returns its output. \
         Input is the complete command line, e.g. `aws ec2 describe-vpcs --output json`."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The full AWS CLI command to execute"
                }
            },
            "required": ["command"]
        })
    }

    fn lane(&self) -> Lane {
        Lane::CommandExecution
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let raw = text_argument(&arguments, "command")?;
        let command = ensure_quotes_balanced(raw.trim());

        if !self.is_command_allowed(&command) {
            return Err(ToolError::PermissionDenied {
                tool_name: NAME.into(),
                reason: format!(
                    "Command '{}' not in allowlist",
                    command.split_whitespace().next().unwrap_or("")
                ),
            });
        }

        debug!(command = %command, "Running AWS CLI command");
        let output = self.executor.run(&command).await?;
        Ok(classify_output(&command, &output))
    }
}
