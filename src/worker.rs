// Live-data publisher: every live interval, snapshot the store and broadcast it to /ws clients.
// Also logs periodic app stats.

use crate::models::LiveData;
use crate::store::Store;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, watch};
use tokio::time::{Duration, Instant, interval};

/// Rate limit for "no receivers" debug line (avoid logging every tick when no one is on /ws)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Store, channels, and shutdown for the publisher.
pub struct WorkerDeps {
    pub store: Arc<Store>,
    pub tx: broadcast::Sender<LiveData>,
    pub ws_connections: Arc<AtomicUsize>,
    pub shutdown_rx: watch::Receiver<bool>,
}

pub struct WorkerConfig {
    pub live_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        store,
        tx,
        ws_connections,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        live_interval_ms,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(live_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_no_receivers_warn: Option<Instant> = None;
        let mut published_total: u64 = 0;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if tx.send(store.live_data()).is_err() {
                        let should_warn = last_no_receivers_warn
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                        if should_warn {
                            tracing::debug!(
                                operation = "broadcast_live_data",
                                "No active WebSocket clients; broadcast channel has no receivers"
                            );
                            last_no_receivers_warn = Some(Instant::now());
                        }
                    } else {
                        published_total += 1;
                    }
                }
                _ = stats_log_tick.tick() => {
                    let (interfaces, devices, targets) = store.sizes();
                    tracing::info!(
                        ws_clients = ws_connections.load(std::sync::atomic::Ordering::Relaxed),
                        interfaces,
                        devices,
                        probe_targets = targets,
                        published_total,
                        "app stats"
                    );
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        tracing::debug!("Publisher shutting down");
                        break;
                    }
                }
            }
        }
    })
}
