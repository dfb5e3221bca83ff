//! Process-level collaborators: the shell and the Python interpreter.
//!
//! Both are plain text-in, text-out. Neither is sandboxed.

use async_trait::async_trait;
use crate::error::ToolError;

/// Runs a shell command line and returns its textual output.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, command: &str) -> std::result::Result<String, ToolError>;
}

/// Executes a Python program and returns what it printed.
#[async_trait]
pub trait CodeInterpreter: Send + Sync {
    async fn run(&self, source: &str) -> std::result::Result<String, ToolError>;
}
