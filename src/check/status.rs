use serde::{Deserialize, Serialize};

use crate::exec::{ExecError, ExecResult};

/// Health status reported to the service-discovery registry.
///
/// The string forms cross the wire and must stay stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passing,
    Warning,
    Critical,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passing => "passing",
            CheckStatus::Warning => "warning",
            CheckStatus::Critical => "critical",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map one invocation outcome to a status.
///
/// A single table keeps the error-dominates rule total over every exit code,
/// pathological values included.
pub fn classify(exit_code: i32, error: Option<&ExecError>) -> CheckStatus {
    match (error, exit_code) {
        (Some(_), _) => CheckStatus::Critical,
        (None, 0) => CheckStatus::Passing,
        (None, 1) => CheckStatus::Warning,
        (None, _) => CheckStatus::Critical,
    }
}

/// Select the output string published alongside the status.
///
/// Deadline expiry publishes the canonical deadline message, other execution
/// errors publish the error text, and a clean invocation publishes the
/// captured script output.
pub fn ttl_output(result: &ExecResult) -> String {
    match &result.error {
        Some(err) => err.to_string(),
        None => String::from_utf8_lossy(&result.output).into_owned(),
    }
}
