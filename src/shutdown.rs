use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

use crate::check::CheckSupervisor;

/// Block until SIGTERM or SIGINT arrives, then shut the supervisor down.
///
/// On the first signal the shared `shutdown` token is cancelled, telling
/// every registered check runner to deliver one final heartbeat, and the
/// supervisor is drained so the call only returns once every terminal
/// status has been published. Runners themselves never cancel the token;
/// this is the one place it fires.
pub async fn run_until_signalled(supervisor: &CheckSupervisor, shutdown: CancellationToken) {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    let pending = supervisor.len().await;
    tracing::info!(
        signal = received,
        checks = pending,
        "Shutting down, delivering final check statuses"
    );

    shutdown.cancel();
    supervisor.drain().await;
}
