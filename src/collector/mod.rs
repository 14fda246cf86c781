// Periodic collectors. Each one runs as its own task on its own interval and writes only to the
// shared Store; shutdown is observed between ticks, never in the middle of one.

pub mod devices;
pub mod reachability;
pub mod traffic;

use std::future::Future;
use tokio::sync::watch;
use tokio::time::{Duration, interval};
use tracing::Instrument;

/// One unit of periodic work. A failed tick logs and returns; the next tick runs regardless.
pub trait Collector: Send + Sync + 'static {
    /// Short name used in logs and spans.
    fn name(&self) -> &'static str;

    fn tick(&self) -> impl Future<Output = ()> + Send;
}

/// Spawns `collector` on a fixed period. The first tick fires immediately.
/// The task exits once `shutdown_rx` flips to true or its sender is dropped.
pub fn spawn<C: Collector>(
    collector: C,
    interval_ms: u64,
    mut shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let span = tracing::span!(
        tracing::Level::DEBUG,
        "collector",
        collector = collector.name(),
        interval_ms
    );
    tokio::spawn(
        async move {
            let mut tick = interval(Duration::from_millis(interval_ms));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            tracing::info!(collector = collector.name(), interval_ms, "collector started");

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        collector.tick().await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::debug!(collector = collector.name(), "collector shutting down");
                            break;
                        }
                    }
                }
            }
        }
        .instrument(span),
    )
}
