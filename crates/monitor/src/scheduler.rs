//! Periodic background cycles.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Run `job` now and then every `interval` until `shutdown` flips to `true`.
///
/// Each iteration runs in its own task, so a panic ends only that iteration.
/// An iteration that is already running when shutdown is signalled is
/// awaited before the loop exits.
pub fn spawn_cycle<F, Fut>(
    name: &'static str,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    spawn_cycle_after(name, Duration::ZERO, interval, shutdown, job)
}

/// Like [`spawn_cycle`], with the first iteration held back by `first_delay`.
pub fn spawn_cycle_after<F, Fut>(
    name: &'static str,
    first_delay: Duration,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tracing::info!(cycle = name, interval_secs = interval.as_secs(), "Cycle scheduled");

        if !first_delay.is_zero() && !wait_or_stop(first_delay, &mut shutdown).await {
            tracing::info!(cycle = name, "Cycle stopped");
            return;
        }

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = tokio::spawn(job()).await {
                tracing::error!(cycle = name, error = %e, "Cycle iteration aborted");
            }

            if !wait_or_stop(interval, &mut shutdown).await {
                break;
            }
        }

        tracing::info!(cycle = name, "Cycle stopped");
    })
}

/// Sleep for `duration`; `false` when shutdown was signalled first.
async fn wait_or_stop(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
    }
}
