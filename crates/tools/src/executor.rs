//! Process-backed executors: `sh -c` for commands, `python3 -` for code.
//!
//! Neither is sandboxed. Whatever the model writes runs with the
//! privileges of this process.

use async_trait::async_trait;
use std::process::Stdio;
use stratus_core::error::ToolError;
use stratus_core::executor::{CodeInterpreter, CommandExecutor};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Runs command lines through the system shell.
#[derive(Debug, Default, Clone)]
pub struct ShellExecutor;

impl ShellExecutor {
    pub fn new() -> Self {
        Self
    }
}

/// Join stdout and stderr the way the model sees them.
///
/// A failed command is prefixed with its exit code.
fn format_output(success: bool, code: Option<i32>, stdout: &str, stderr: &str) -> String {
    let text = if success {
        if stderr.trim().is_empty() {
            stdout.to_string()
        } else {
            format!("{stdout}\n[stderr]: {stderr}")
        }
    } else {
        let code = code.unwrap_or(-1);
        format!("[exit code: {code}]\n{stdout}\n{stderr}")
    };
    text.trim().to_string()
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn run(&self, command: &str) -> Result<String, ToolError> {
        debug!(command = %command, "Executing shell command");

        let output = if cfg!(target_os = "windows") {
            Command::new("cmd").args(["/C", command]).output().await
        } else {
            Command::new("sh").args(["-c", command]).output().await
        };
        let output = output.map_err(|e| ToolError::ExecutionFailed {
            tool_name: "shell".into(),
            reason: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            warn!(command = %command, exit_code = ?output.status.code(), "Command failed");
        }
        Ok(format_output(
            output.status.success(),
            output.status.code(),
            &stdout,
            &stderr,
        ))
    }
}

/// Runs Python source through an external interpreter.
///
/// When bootstrap packages are configured they are installed with pip once,
/// before the first program runs.
pub struct PythonInterpreter {
    python: String,
    bootstrap_packages: Vec<String>,
    bootstrapped: OnceCell<()>,
}

impl PythonInterpreter {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            bootstrap_packages: Vec::new(),
            bootstrapped: OnceCell::new(),
        }
    }

    pub fn with_bootstrap(mut self, packages: Vec<String>) -> Self {
        self.bootstrap_packages = packages;
        self
    }

    async fn bootstrap(&self) -> Result<(), ToolError> {
        if self.bootstrap_packages.is_empty() {
            return Ok(());
        }
        self.bootstrapped
            .get_or_try_init(|| async {
                info!(packages = ?self.bootstrap_packages, "Installing interpreter packages");
                let output = Command::new(&self.python)
                    .args(["-m", "pip", "install", "--quiet"])
                    .args(&self.bootstrap_packages)
                    .output()
                    .await
                    .map_err(|e| self.failure(e.to_string()))?;
                if output.status.success() {
                    Ok(())
                } else {
                    Err(self.failure(format!(
                        "pip install failed: {}",
                        String::from_utf8_lossy(&output.stderr).trim()
                    )))
                }
            })
            .await
            .map(|_| ())
    }

    fn failure(&self, reason: String) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: "python".into(),
            reason,
        }
    }
}

#[async_trait]
impl CodeInterpreter for PythonInterpreter {
    async fn run(&self, source: &str) -> Result<String, ToolError> {
        self.bootstrap().await?;

        warn!(bytes = source.len(), "Executing model-generated Python without a sandbox");

        let mut child = Command::new(&self.python)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failure(format!("failed to start {}: {e}", self.python)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .await
                .map_err(|e| self.failure(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.failure(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() {
            Ok(stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(self.failure(format_output(false, output.status.code(), &stdout, &stderr)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_success_without_stderr() {
        assert_eq!(format_output(true, Some(0), "out\n", ""), "out");
    }

    #[test]
    fn format_success_with_stderr() {
        assert_eq!(
            format_output(true, Some(0), "out", "warn"),
            "out\n[stderr]: warn"
        );
    }

    #[test]
    fn format_failure_carries_exit_code() {
        let text = format_output(false, Some(254), "", "An error occurred (AccessDenied)");
        assert!(text.starts_with("[exit code: 254]"));
        assert!(text.contains("An error occurred"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_runs_commands() {
        let out = ShellExecutor::new().run("echo hello").await.unwrap();
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_reports_failures_as_text() {
        let out = ShellExecutor::new().run("echo oops >&2; exit 3").await.unwrap();
        assert!(out.contains("[exit code: 3]"));
        assert!(out.contains("oops"));
    }

    #[tokio::test]
    async fn missing_interpreter_is_execution_failure() {
        let interpreter = PythonInterpreter::new("definitely-not-a-python-binary");
        let err = interpreter.run("print(1)").await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }
}
