//! Script execution port.
//!
//! A [`ScriptExecutor`] runs one check command with a deadline and reports
//! captured output, the exit code, and any execution error. Executors cannot
//! be cancelled by the caller; the only way to bound an invocation's
//! wall-clock is the timeout passed to [`ScriptExecutor::exec`]. Implementors
//! must be safe for concurrent invocation across check runners.

use std::time::Duration;

use async_trait::async_trait;

pub mod shell;

pub use shell::ShellExecutor;

/// Upper bound on captured script output. The service-discovery registry
/// truncates check output at 4 KiB, so anything past this is discarded at
/// capture time.
pub const MAX_OUTPUT_BYTES: usize = 4096;

/// Error produced by a script invocation.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The invocation did not complete before its timeout.
    #[error("deadline has elapsed")]
    DeadlineExceeded,

    /// The command could not be spawned or waited on.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The invocation task itself failed.
    #[error("{0}")]
    Internal(String),
}

impl ExecError {
    pub fn is_deadline(&self) -> bool {
        matches!(self, ExecError::DeadlineExceeded)
    }
}

/// Outcome of one script invocation.
///
/// `error` is present iff the executor reports a problem, including deadline
/// expiry. The exit code is executor-defined and meaningless when `error` is
/// set; status classification always lets the error dominate.
#[derive(Debug)]
pub struct ExecResult {
    pub output: Vec<u8>,
    pub exit_code: i32,
    pub error: Option<ExecError>,
}

impl ExecResult {
    /// A synthesized deadline-expiry outcome with no captured output.
    pub fn deadline_exceeded() -> Self {
        Self {
            output: Vec::new(),
            exit_code: 0,
            error: Some(ExecError::DeadlineExceeded),
        }
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        self.error.as_ref().is_some_and(ExecError::is_deadline)
    }
}

/// Runs one check command with a deadline.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Execute `command` with `args`, returning within roughly `timeout` of
    /// the start or reporting [`ExecError::DeadlineExceeded`].
    async fn exec(&self, timeout: Duration, command: &str, args: &[String]) -> ExecResult;
}
