// Device discovery collector: neighbor table + subnet sweep + reverse DNS -> Store::update_device

use super::Collector;
use crate::discovery::{HostDiscovery, SubnetSweep};
use crate::store::Store;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Sighting {
    mac: String,
    hostname: String,
}

pub struct DeviceCollector<D, S> {
    store: Arc<Store>,
    discovery: Arc<D>,
    /// `None` disables the active sweep; only the neighbor table is used.
    sweeper: Option<Arc<S>>,
}

impl<D: HostDiscovery, S: SubnetSweep> DeviceCollector<D, S> {
    pub fn new(store: Arc<Store>, discovery: Arc<D>, sweeper: Option<Arc<S>>) -> Self {
        Self {
            store,
            discovery,
            sweeper,
        }
    }

    /// One discovery pass. A neighbor-table failure skips the pass without touching the store.
    pub async fn collect(&self) {
        let neighbors = match self.discovery.neighbors().await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "neighbors",
                    "neighbor table read failed; skipping tick"
                );
                return;
            }
        };

        let mut sightings: BTreeMap<Ipv4Addr, Sighting> = neighbors
            .into_iter()
            .map(|n| {
                (
                    n.ip,
                    Sighting {
                        mac: n.mac,
                        hostname: String::new(),
                    },
                )
            })
            .collect();
        let from_table = sightings.len();

        if let Some(sweeper) = &self.sweeper {
            match self.discovery.local_subnet() {
                Some(subnet) => {
                    for ip in sweeper.sweep(subnet).await {
                        sightings.entry(ip).or_default();
                    }
                }
                None => tracing::debug!("no local IPv4 subnet; skipping sweep"),
            }
        }

        for (ip, sighting) in sightings.iter_mut() {
            if sighting.hostname.is_empty() {
                sighting.hostname = self.discovery.resolve_hostname(*ip).await;
            }
        }

        for (ip, sighting) in &sightings {
            self.store
                .update_device(&ip.to_string(), &sighting.mac, &sighting.hostname);
        }

        tracing::debug!(
            devices = sightings.len(),
            from_table,
            "device discovery pass finished"
        );
    }
}

impl<D: HostDiscovery, S: SubnetSweep> Collector for DeviceCollector<D, S> {
    fn name(&self) -> &'static str {
        "devices"
    }

    async fn tick(&self) {
        self.collect().await;
    }
}
