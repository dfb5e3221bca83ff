//! Response tool — how the model hands back its final answer.
//!
//! The reasoning loop never dispatches this tool: an action in the
//! [`Lane::FinalResponse`] lane finishes the session with the action input
//! as the answer. `execute` exists for callers that invoke it directly and
//! simply echoes the text.

use async_trait::async_trait;
use stratus_core::error::ToolError;
use stratus_core::tool::{Lane, Tool, ToolResult, text_argument};

pub const NAME: &str = "response_tool";

#[derive(Debug, Default)]
pub struct ResponseTool;

#[async_trait]
impl Tool for ResponseTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Sends the final answer to the user. Input is the complete answer text. \
         Mention the diagram file name if one was produced."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "response": { "type": "string", "description": "The answer for the user" }
            },
            "required": ["response"]
        })
    }

    fn lane(&self) -> Lane {
        Lane::FinalResponse
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let text = text_argument(&arguments, "response")?;
        Ok(ToolResult {
            success: true,
            output: text,
            data: None,
        })
    }
}
