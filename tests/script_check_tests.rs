
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use scriptcheck::check::{CheckRunner, CheckSpec, CheckStatus};
use test_doubles::{
    init_test_logging, BlockingExec, ChannelHeartbeater, FailingHeartbeater, SimpleExec,
    SleeperExec,
};

const WAIT_BOUND: Duration = Duration::from_secs(3);
const HOUR: Duration = Duration::from_secs(3600);

fn sleeper_spec() -> CheckSpec {
    CheckSpec::new("alloc1", "task1", "check1", "sleeper", "/bin/sleep")
        .with_interval(HOUR)
        .with_timeout(HOUR)
}

/// Cancelling a check shortcircuits a running script: the worker exits
/// without publishing, and the executor is left running.
#[tokio::test]
async fn cancel_during_exec_skips_heartbeat() {
    init_test_logging();
    let (exec, mut running) = BlockingExec::new();
    let (heartbeat, mut updates) = ChannelHeartbeater::new();
    let shutdown = CancellationToken::new();

    let runner = CheckRunner::new(sleeper_spec(), exec.clone(), heartbeat, shutdown);
    let handle = runner.run();

    running.recv().await.expect("exec should be invoked");
    handle.cancel();

    timeout(WAIT_BOUND, handle.wait())
        .await
        .expect("timed out waiting for script check to exit");

    // The executor cannot be cancelled; only the worker gave up on it.
    assert!(!exec.has_exited(), "executor should still be running");
    assert!(updates.try_recv().is_err(), "no heartbeat expected");

    exec.release();
}

/// A check that outlives its timeout goes critical without waiting for the
/// executor to come back.
#[tokio::test]
async fn timeout_goes_critical() {
    init_test_logging();
    let (exec, mut running) = BlockingExec::new();
    let (heartbeat, mut updates) = ChannelHeartbeater::new();
    let shutdown = CancellationToken::new();

    let spec = sleeper_spec().with_timeout(Duration::from_secs(1));
    let handle = CheckRunner::new(spec, exec.clone(), heartbeat, shutdown).run();

    running.recv().await.expect("exec should be invoked");

    let update = timeout(WAIT_BOUND, updates.recv())
        .await
        .expect("timed out waiting for TTL update")
        .expect("updates channel closed");
    assert_eq!(update.status, CheckStatus::Critical);

    assert!(!exec.has_exited(), "executor should still be running");

    handle.cancel();
    timeout(WAIT_BOUND, handle.wait())
        .await
        .expect("timed out waiting for script check to exit");
    assert!(updates.try_recv().is_err(), "no heartbeat after exit");

    exec.release();
}

/// The timeout always publishes the canonical deadline message, never the
/// script's own output.
#[tokio::test]
async fn timeout_publishes_deadline_message() {
    init_test_logging();
    let (heartbeat, mut updates) = ChannelHeartbeater::new();
    let shutdown = CancellationToken::new();

    let spec = sleeper_spec().with_timeout(Duration::from_nanos(1));
    let handle = CheckRunner::new(spec, Arc::new(SleeperExec), heartbeat, shutdown).run();

    let update = timeout(WAIT_BOUND, updates.recv())
        .await
        .expect("timed out waiting for TTL update")
        .expect("updates channel closed");
    assert_eq!(update.status, CheckStatus::Critical);
    assert_eq!(update.output, "deadline has elapsed");

    handle.cancel();
}

/// Closing the shutdown signal before the first tick still delivers exactly
/// one heartbeat.
#[tokio::test]
async fn shutdown_delivers_one_final_heartbeat() {
    init_test_logging();
    let (heartbeat, mut updates) = ChannelHeartbeater::new();
    let shutdown = CancellationToken::new();

    let spec = sleeper_spec().with_timeout(WAIT_BOUND);
    let runner = CheckRunner::new(spec, SimpleExec::new(0, None), heartbeat, shutdown.clone());

    shutdown.cancel();
    let handle = runner.run();

    let update = timeout(WAIT_BOUND, updates.recv())
        .await
        .expect("timed out waiting for TTL update")
        .expect("updates channel closed");
    assert_eq!(update.status, CheckStatus::Passing);

    timeout(WAIT_BOUND, handle.wait())
        .await
        .expect("timed out waiting for script check to exit");
    assert!(updates.try_recv().is_err(), "exactly one heartbeat expected");
}

/// Shutdown observed while waiting out the interval runs the check once more
/// before exiting.
#[tokio::test]
async fn shutdown_runs_check_once_more() {
    init_test_logging();
    let (heartbeat, mut updates) = ChannelHeartbeater::new();
    let shutdown = CancellationToken::new();

    let spec = sleeper_spec().with_timeout(WAIT_BOUND);
    let handle = CheckRunner::new(spec, SimpleExec::new(0, None), heartbeat, shutdown.clone()).run();

    // First tick is immediate.
    let first = timeout(WAIT_BOUND, updates.recv())
        .await
        .expect("timed out waiting for first TTL update")
        .expect("updates channel closed");
    assert_eq!(first.status, CheckStatus::Passing);

    // The interval is an hour out; only shutdown can unblock the worker.
    shutdown.cancel();

    let last = timeout(WAIT_BOUND, updates.recv())
        .await
        .expect("timed out waiting for final TTL update")
        .expect("updates channel closed");
    assert_eq!(last.status, CheckStatus::Passing);

    timeout(WAIT_BOUND, handle.wait())
        .await
        .expect("timed out waiting for script check to exit");
    assert!(updates.try_recv().is_err(), "no heartbeat after the final one");
}

/// Cancel wins over shutdown when both are pending: no final heartbeat.
#[tokio::test]
async fn cancel_beats_shutdown() {
    init_test_logging();
    let (exec, mut running) = BlockingExec::new();
    let (heartbeat, mut updates) = ChannelHeartbeater::new();
    let shutdown = CancellationToken::new();

    let handle = CheckRunner::new(sleeper_spec(), exec.clone(), heartbeat, shutdown.clone()).run();

    running.recv().await.expect("exec should be invoked");
    handle.cancel();
    shutdown.cancel();

    timeout(WAIT_BOUND, handle.wait())
        .await
        .expect("timed out waiting for script check to exit");
    assert!(updates.try_recv().is_err(), "cancel owes no final heartbeat");

    exec.release();
}

async fn assert_publishes(code: i32, error: Option<&str>, expected: CheckStatus) {
    let (heartbeat, mut updates) = ChannelHeartbeater::new();
    let shutdown = CancellationToken::new();

    let spec = sleeper_spec().with_timeout(WAIT_BOUND);
    let handle = CheckRunner::new(spec, SimpleExec::new(code, error), heartbeat, shutdown).run();

    let update = timeout(WAIT_BOUND, updates.recv())
        .await
        .expect("timed out waiting for TTL update")
        .expect("updates channel closed");
    assert_eq!(update.status, expected, "code={code} error={error:?}");

    let expected_output = match error {
        Some(e) => e.to_string(),
        None => SimpleExec::expected_output(code),
    };
    assert_eq!(update.output, expected_output, "code={code} error={error:?}");

    handle.cancel();
    timeout(WAIT_BOUND, handle.wait())
        .await
        .expect("timed out waiting for script check to exit");
}

#[tokio::test]
async fn exit_codes_map_to_statuses() {
    init_test_logging();
    assert_publishes(0, None, CheckStatus::Passing).await;
    assert_publishes(1, None, CheckStatus::Warning).await;
    assert_publishes(2, None, CheckStatus::Critical).await;
    assert_publishes(9000, None, CheckStatus::Critical).await;
}

#[tokio::test]
async fn exec_errors_are_always_critical() {
    init_test_logging();
    for code in [0, 1, 2, 9000] {
        assert_publishes(code, Some("test error"), CheckStatus::Critical).await;
    }
}

/// Failed TTL updates are logged and the check keeps running.
#[tokio::test]
async fn heartbeat_failure_does_not_stop_the_check() {
    init_test_logging();
    let heartbeat = FailingHeartbeater::new();
    let shutdown = CancellationToken::new();

    let spec = sleeper_spec()
        .with_interval(Duration::from_millis(10))
        .with_timeout(WAIT_BOUND);
    let handle = CheckRunner::new(
        spec,
        SimpleExec::new(0, None),
        heartbeat.clone(),
        shutdown,
    )
    .run();

    timeout(WAIT_BOUND, async {
        while heartbeat.call_count() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("check should keep publishing despite heartbeat failures");

    handle.cancel();
    timeout(WAIT_BOUND, handle.wait())
        .await
        .expect("timed out waiting for script check to exit");
}

/// Handles tolerate repeated cancels and repeated wait observations.
#[tokio::test]
async fn handle_is_idempotent() {
    init_test_logging();
    let (heartbeat, _updates) = ChannelHeartbeater::new();
    let shutdown = CancellationToken::new();

    let spec = sleeper_spec().with_timeout(WAIT_BOUND);
    let handle = CheckRunner::new(spec, SimpleExec::new(0, None), heartbeat, shutdown).run();

    handle.cancel();
    handle.cancel();

    timeout(WAIT_BOUND, handle.wait())
        .await
        .expect("timed out waiting for script check to exit");
    timeout(WAIT_BOUND, handle.wait())
        .await
        .expect("wait should be observable repeatedly");

    let observer = handle.clone();
    observer.wait().await;
    assert!(handle.is_finished());
}
