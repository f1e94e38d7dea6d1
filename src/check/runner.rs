use std::sync::Arc;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::check::status::{classify, ttl_output};
use crate::check::CheckSpec;
use crate::exec::{ExecError, ExecResult, ScriptExecutor};
use crate::heartbeat::TtlHeartbeater;

/// Supervises one script check: runs the script on its interval, classifies
/// the outcome, and renews the check's TTL with the registry.
///
/// A runner is single-use. [`CheckRunner::run`] consumes it, spawns the
/// worker task, and returns a [`CheckHandle`] for cancellation and
/// termination tracking.
pub struct CheckRunner {
    spec: CheckSpec,
    exec: Arc<dyn ScriptExecutor>,
    heartbeat: Arc<dyn TtlHeartbeater>,
    shutdown: CancellationToken,
}

/// Handle to a running check worker.
#[derive(Debug, Clone)]
pub struct CheckHandle {
    cancel: CancellationToken,
    done: CancellationToken,
}

impl CheckHandle {
    /// Request termination at the worker's next suspension point.
    ///
    /// Idempotent and non-blocking. Does not abort an in-flight script and
    /// does not force a final heartbeat.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Completes once the worker has fully released its resources. After it
    /// resolves, no further heartbeats will be published for this check.
    /// May be awaited any number of times, by any number of observers.
    pub fn wait(&self) -> WaitForCancellationFuture<'_> {
        self.done.cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.done.is_cancelled()
    }
}

impl CheckRunner {
    /// `shutdown` is the process-wide broadcast token: when it fires, the
    /// worker performs exactly one more check-and-publish cycle before
    /// exiting, so the registry learns the check's terminal status. The
    /// runner only observes the token and never cancels it.
    pub fn new(
        spec: CheckSpec,
        exec: Arc<dyn ScriptExecutor>,
        heartbeat: Arc<dyn TtlHeartbeater>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            spec,
            exec,
            heartbeat,
            shutdown,
        }
    }

    /// Spawn the worker task. The first check runs immediately; subsequent
    /// checks wait out the interval after the previous one completes.
    pub fn run(self) -> CheckHandle {
        let cancel = CancellationToken::new();
        let done = CancellationToken::new();
        let handle = CheckHandle {
            cancel: cancel.clone(),
            done: done.clone(),
        };

        tokio::spawn(async move {
            // Completion must be observable even if a tick panics.
            let _done = done.drop_guard();
            self.tick_loop(cancel).await;
        });

        handle
    }

    async fn tick_loop(self, cancel: CancellationToken) {
        loop {
            let Some(result) = self.run_check(&cancel).await else {
                // Cancelled mid-check; nothing is published for it.
                return;
            };

            if result.is_deadline_exceeded() {
                tracing::warn!(
                    check = %self.spec.name,
                    check_id = %self.spec.check_id,
                    timeout = ?self.spec.timeout,
                    "Check timed out"
                );
            } else if let Some(error) = &result.error {
                tracing::warn!(
                    check = %self.spec.name,
                    check_id = %self.spec.check_id,
                    %error,
                    "Check execution failed"
                );
            }

            let status = classify(result.exit_code, result.error.as_ref());
            let output = ttl_output(&result);

            if let Err(error) = self
                .heartbeat
                .update_ttl(&self.spec.check_id, &output, status)
                .await
            {
                tracing::warn!(
                    check = %self.spec.name,
                    check_id = %self.spec.check_id,
                    %error,
                    "Failed to update check TTL"
                );
            }

            if cancel.is_cancelled() {
                return;
            }
            if self.shutdown.is_cancelled() {
                // The update just delivered was the final one.
                return;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = self.shutdown.cancelled() => {
                    // Loop once more: the next cycle is the final delivery.
                }
                _ = tokio::time::sleep(self.spec.interval) => {}
            }
        }
    }

    /// Invoke the executor, racing its completion against this runner's own
    /// deadline and cancellation.
    ///
    /// Returns `None` on cancellation. In both the cancel and the deadline
    /// case the invocation task is abandoned, not aborted: the executor
    /// offers no cancel path and runs out its own timeout in the background.
    async fn run_check(&self, cancel: &CancellationToken) -> Option<ExecResult> {
        let exec = Arc::clone(&self.exec);
        let timeout = self.spec.timeout;
        let command = self.spec.command.clone();
        let args = self.spec.args.clone();

        let mut invocation = tokio::spawn(async move { exec.exec(timeout, &command, &args).await });

        tokio::select! {
            biased;
            joined = &mut invocation => Some(match joined {
                Ok(result) => result,
                Err(error) => ExecResult {
                    output: Vec::new(),
                    exit_code: 0,
                    error: Some(ExecError::Internal(error.to_string())),
                },
            }),
            _ = cancel.cancelled() => None,
            _ = tokio::time::sleep(timeout) => Some(ExecResult::deadline_exceeded()),
        }
    }
}
