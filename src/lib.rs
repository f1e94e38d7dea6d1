//! Script health-check supervisor.
//!
//! Periodically runs external scripts on behalf of allocated tasks and
//! reports their exit status to a service-discovery registry via TTL
//! heartbeats.

pub mod check;
pub mod error;
pub mod exec;
pub mod heartbeat;
pub mod shutdown;

pub use check::{CheckHandle, CheckRunner, CheckSpec, CheckStatus, CheckSupervisor};
pub use error::{Result, SupervisorError};
pub use exec::{ExecError, ExecResult, ScriptExecutor, ShellExecutor};
pub use heartbeat::{HeartbeatError, TtlHeartbeater};
