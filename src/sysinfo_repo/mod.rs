// Interface byte/packet counters via sysinfo

use crate::collector::traffic::CounterSource;
use crate::models::InterfaceCounters;
use std::sync::Arc;
use sysinfo::Networks;
use tracing::instrument;

pub struct SysinfoRepo {
    networks: Arc<std::sync::Mutex<Networks>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let networks = Networks::new_with_refreshed_list();
        Self {
            networks: Arc::new(std::sync::Mutex::new(networks)),
        }
    }

    /// Cumulative counters per interface since boot (not deltas since the last refresh).
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "interface_counters"))]
    pub async fn interface_counters(&self) -> anyhow::Result<Vec<(String, InterfaceCounters)>> {
        let networks = self.networks.clone();
        tokio::task::spawn_blocking(move || {
            let mut networks_guard = networks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
            networks_guard.refresh(true);
            let counters = networks_guard
                .list()
                .iter()
                .map(|(name, data)| {
                    (
                        name.clone(),
                        InterfaceCounters {
                            bytes_rx: data.total_received(),
                            bytes_tx: data.total_transmitted(),
                            packets_rx: data.total_packets_received(),
                            packets_tx: data.total_packets_transmitted(),
                        },
                    )
                })
                .collect();
            Ok(counters)
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}

impl CounterSource for SysinfoRepo {
    async fn interface_counters(&self) -> anyhow::Result<Vec<(String, InterfaceCounters)>> {
        SysinfoRepo::interface_counters(self).await
    }
}
