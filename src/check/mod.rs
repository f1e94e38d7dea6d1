//! Script check supervision.
//!
//! One worker per registered check runs an external script on an interval
//! and reports the result to the service-discovery registry as a TTL
//! heartbeat:
//!
//! 1. Worker invokes the script through the [`ScriptExecutor`](crate::exec::ScriptExecutor) port
//! 2. Exit code and execution errors map to a [`CheckStatus`]
//! 3. Status and captured output are published via
//!    [`TtlHeartbeater`](crate::heartbeat::TtlHeartbeater)
//! 4. Worker sleeps out the interval, watching for cancellation or shutdown
//!
//! # Components
//!
//! - [`CheckSpec`]: a check's immutable parameters
//! - [`CheckRunner`]: the per-check worker; [`CheckHandle`] cancels it and
//!   observes its termination
//! - [`CheckSupervisor`]: registry managing one runner per check
//!
//! On shutdown every worker performs exactly one more check so the registry
//! learns each check's terminal status.

pub mod runner;
pub mod spec;
pub mod status;
pub mod supervisor;

pub use runner::{CheckHandle, CheckRunner};
pub use spec::CheckSpec;
pub use status::{classify, ttl_output, CheckStatus};
pub use supervisor::CheckSupervisor;
