//! TTL heartbeat port to the service-discovery registry.

use async_trait::async_trait;

use crate::check::CheckStatus;

/// Error type for heartbeat delivery failures.
///
/// Delivery errors are advisory: the check runner logs them and keeps
/// operating, retrying nothing within the current tick.
#[derive(Debug, thiserror::Error)]
pub enum HeartbeatError {
    #[error("check is not registered with the registry: {0}")]
    UnknownCheck(String),

    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Renews a check's TTL with the service-discovery registry.
///
/// One call delivers one status update for `check_id`. Implementors must be
/// safe for concurrent use across check runners.
#[async_trait]
pub trait TtlHeartbeater: Send + Sync {
    async fn update_ttl(
        &self,
        check_id: &str,
        output: &str,
        status: CheckStatus,
    ) -> Result<(), HeartbeatError>;
}
