// Reachability collector: probes each target in turn and records every outcome.

use super::Collector;
use crate::config::ProbeConfig;
use crate::probe::{Prober, gateway, probe_host};
use crate::store::Store;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

const GATEWAY_VALIDATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Gateway (if any) first, then the configured hosts in order, without duplicates.
pub fn target_list(configured: &[String], gateway: Option<Ipv4Addr>) -> Vec<String> {
    let mut targets: Vec<String> = Vec::with_capacity(configured.len() + 1);
    let candidates = gateway
        .map(|g| g.to_string())
        .into_iter()
        .chain(configured.iter().map(|t| t.trim().to_string()));
    for target in candidates {
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    targets
}

pub struct ReachabilityCollector<P> {
    store: Arc<Store>,
    prober: Arc<P>,
    targets: Vec<String>,
    tcp_ports: Vec<u16>,
}

impl<P: Prober> ReachabilityCollector<P> {
    /// Builds the target list, running gateway detection once when enabled.
    pub async fn new(store: Arc<Store>, prober: Arc<P>, config: &ProbeConfig) -> Self {
        let gateway = if config.detect_gateway {
            gateway::detect_gateway(GATEWAY_VALIDATION_TIMEOUT).await
        } else {
            None
        };
        let targets = target_list(&config.targets, gateway);
        tracing::info!(
            os = std::env::consts::OS,
            targets = ?targets,
            "initialized ping collector"
        );
        Self::with_targets(store, prober, targets, config.tcp_ports.clone())
    }

    pub fn with_targets(
        store: Arc<Store>,
        prober: Arc<P>,
        targets: Vec<String>,
        tcp_ports: Vec<u16>,
    ) -> Self {
        Self {
            store,
            prober,
            targets,
            tcp_ports,
        }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// One pass over all targets, sequentially. A slow target delays the rest of this pass only.
    pub async fn collect(&self) {
        for target in &self.targets {
            let outcome = probe_host(self.prober.as_ref(), target, &self.tcp_ports).await;
            self.store.record_probe(
                target,
                outcome.latency.unwrap_or(Duration::ZERO),
                outcome.success(),
                outcome.method,
            );

            match (outcome.latency, &outcome.error) {
                (Some(rtt), _) => tracing::debug!(
                    host = %target,
                    method = %outcome.method,
                    rtt_ms = rtt.as_secs_f64() * 1000.0,
                    "ping ok"
                ),
                (None, Some(e)) => tracing::debug!(host = %target, error = %e, "ping failed"),
                (None, None) => tracing::debug!(host = %target, "ping failed"),
            }
        }
    }
}

impl<P: Prober> Collector for ReachabilityCollector<P> {
    fn name(&self) -> &'static str {
        "reachability"
    }

    async fn tick(&self) {
        self.collect().await;
    }
}
