use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SupervisorError};

/// Immutable parameters of one registered script check.
///
/// `interval` is the minimum gap between the end of one invocation and the
/// start of the next; `timeout` bounds a single invocation and is enforced by
/// the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Allocation the checked task belongs to.
    pub allocation_id: String,
    /// Task the check is attached to.
    pub task_name: String,
    /// Registry-side check identifier used for TTL updates.
    pub check_id: String,
    /// Diagnostic label.
    pub name: String,
    pub interval: Duration,
    pub timeout: Duration,
    pub command: String,
    pub args: Vec<String>,
}

impl CheckSpec {
    pub fn new(
        allocation_id: impl Into<String>,
        task_name: impl Into<String>,
        check_id: impl Into<String>,
        name: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            allocation_id: allocation_id.into(),
            task_name: task_name.into(),
            check_id: check_id.into(),
            name: name.into(),
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
            command: command.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject specs that could never produce a meaningful check.
    ///
    /// Called at registration time. A running worker never panics on a bad
    /// spec: an unrunnable command surfaces as critical heartbeats through
    /// the executor error path instead.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(SupervisorError::ZeroInterval);
        }
        if self.timeout.is_zero() {
            return Err(SupervisorError::ZeroTimeout);
        }
        if self.command.is_empty() {
            return Err(SupervisorError::EmptyCommand);
        }
        Ok(())
    }
}
