// Interface throughput collector: OS counters -> Store::update_interface

use super::Collector;
use crate::models::InterfaceCounters;
use crate::store::Store;
use std::future::Future;
use std::sync::Arc;

/// Loopback interface names on Linux, macOS/BSD and Windows.
const LOOPBACK_NAMES: &[&str] = &["lo", "lo0", "Loopback Pseudo-Interface 1"];

pub fn is_loopback_name(name: &str) -> bool {
    LOOPBACK_NAMES.contains(&name)
}

/// Source of cumulative per-interface counters.
pub trait CounterSource: Send + Sync + 'static {
    fn interface_counters(
        &self,
    ) -> impl Future<Output = anyhow::Result<Vec<(String, InterfaceCounters)>>> + Send;
}

pub struct TrafficCollector<S> {
    store: Arc<Store>,
    source: Arc<S>,
}

impl<S: CounterSource> TrafficCollector<S> {
    pub fn new(store: Arc<Store>, source: Arc<S>) -> Self {
        Self { store, source }
    }

    /// Reads all counters and applies them. On a read error nothing is written.
    pub async fn collect(&self) {
        let counters = match self.source.interface_counters().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "interface_counters",
                    "interface counters failed; skipping tick"
                );
                return;
            }
        };

        for (name, c) in counters.iter().filter(|(name, _)| !is_loopback_name(name)) {
            self.store
                .update_interface(name, c.bytes_rx, c.bytes_tx, c.packets_rx, c.packets_tx);
        }
    }
}

impl<S: CounterSource> Collector for TrafficCollector<S> {
    fn name(&self) -> &'static str {
        "traffic"
    }

    async fn tick(&self) {
        self.collect().await;
    }
}
