use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::exec::{ExecResult, ScriptExecutor, MAX_OUTPUT_BYTES};

/// Executes check scripts as child processes.
///
/// The deadline is enforced here, not by the caller: when `timeout` elapses
/// the child is killed and the invocation reports
/// [`ExecError::DeadlineExceeded`](crate::exec::ExecError::DeadlineExceeded).
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    max_output: usize,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self {
            max_output: MAX_OUTPUT_BYTES,
        }
    }
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the captured-output bound.
    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }
}

#[async_trait]
impl ScriptExecutor for ShellExecutor {
    async fn exec(&self, timeout: Duration, command: &str, args: &[String]) -> ExecResult {
        tracing::debug!(command, ?args, ?timeout, "Executing check script");

        let child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(command, error = %e, "Failed to spawn check script");
                return ExecResult {
                    output: Vec::new(),
                    exit_code: 0,
                    error: Some(e.into()),
                };
            }
        };

        // Dropping the in-flight future on expiry kills the child via
        // kill_on_drop.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Err(_elapsed) => {
                tracing::warn!(command, ?timeout, "Check script timed out");
                ExecResult::deadline_exceeded()
            }
            Ok(Err(e)) => ExecResult {
                output: Vec::new(),
                exit_code: 0,
                error: Some(e.into()),
            },
            Ok(Ok(output)) => {
                // Signal-terminated children carry no exit code.
                let exit_code = output.status.code().unwrap_or(-1);

                let mut captured = output.stdout;
                captured.extend_from_slice(&output.stderr);
                captured.truncate(self.max_output);

                tracing::debug!(command, exit_code, "Check script completed");

                ExecResult {
                    output: captured,
                    exit_code,
                    error: None,
                }
            }
        }
    }
}
