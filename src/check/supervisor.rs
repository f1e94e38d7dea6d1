use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::check::{CheckHandle, CheckRunner, CheckSpec};
use crate::error::{Result, SupervisorError};
use crate::exec::ScriptExecutor;
use crate::heartbeat::TtlHeartbeater;

/// Registry of running script checks, keyed by check id.
///
/// Owns one [`CheckRunner`] worker per registered check. All workers share
/// the executor and heartbeat ports and observe the same shutdown token.
pub struct CheckSupervisor {
    exec: Arc<dyn ScriptExecutor>,
    heartbeat: Arc<dyn TtlHeartbeater>,
    shutdown: CancellationToken,
    checks: RwLock<HashMap<String, CheckHandle>>,
}

impl CheckSupervisor {
    pub fn new(
        exec: Arc<dyn ScriptExecutor>,
        heartbeat: Arc<dyn TtlHeartbeater>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            exec,
            heartbeat,
            shutdown,
            checks: RwLock::new(HashMap::new()),
        }
    }

    /// Validate `spec` and start a worker for it.
    pub async fn register(&self, spec: CheckSpec) -> Result<()> {
        spec.validate()?;

        let mut checks = self.checks.write().await;
        if checks.contains_key(&spec.check_id) {
            return Err(SupervisorError::DuplicateCheck(spec.check_id));
        }

        let check_id = spec.check_id.clone();
        tracing::debug!(
            check = %spec.name,
            check_id = %check_id,
            allocation_id = %spec.allocation_id,
            task = %spec.task_name,
            "Starting script check"
        );

        let runner = CheckRunner::new(
            spec,
            Arc::clone(&self.exec),
            Arc::clone(&self.heartbeat),
            self.shutdown.clone(),
        );
        checks.insert(check_id, runner.run());
        Ok(())
    }

    /// Cancel the check's worker and discard its handle.
    ///
    /// The worker exits at its next suspension point; an in-flight script is
    /// left to the executor.
    pub async fn deregister(&self, check_id: &str) -> Result<()> {
        let handle = self
            .checks
            .write()
            .await
            .remove(check_id)
            .ok_or_else(|| SupervisorError::CheckNotFound(check_id.to_string()))?;
        handle.cancel();
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.checks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.checks.read().await.is_empty()
    }

    /// Wait until every registered worker has terminated.
    ///
    /// Call after the shared shutdown token fires to block until all final
    /// heartbeats have been delivered. The supervisor never cancels the
    /// shutdown token itself.
    pub async fn drain(&self) {
        let handles: Vec<CheckHandle> = self.checks.read().await.values().cloned().collect();
        for handle in &handles {
            handle.wait().await;
        }
        self.checks.write().await.clear();
    }
}
