// Host discovery seams: where neighbors, the local subnet and hostnames come from, and how a
// subnet is swept. Collector logic only sees these traits.

pub mod arp;
pub mod subnet;
pub mod sweep;

use crate::config::NeighborSource;
use ip_network::Ipv4Network;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};

/// One IP/MAC pair from the neighbor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub ip: Ipv4Addr,
    /// Lowercase, colon separated.
    pub mac: String,
}

pub trait HostDiscovery: Send + Sync + 'static {
    fn neighbors(&self) -> impl Future<Output = anyhow::Result<Vec<Neighbor>>> + Send;

    fn local_subnet(&self) -> Option<Ipv4Network>;

    /// Reverse lookup; empty string when there is no name.
    fn resolve_hostname(&self, ip: Ipv4Addr) -> impl Future<Output = String> + Send;
}

pub trait SubnetSweep: Send + Sync + 'static {
    /// Addresses in `subnet` that answered.
    fn sweep(&self, subnet: Ipv4Network) -> impl Future<Output = Vec<Ipv4Addr>> + Send;
}

/// Neighbor table from the OS, subnet from if-addrs, names from the system resolver.
pub struct SystemDiscovery {
    source: NeighborSource,
}

impl SystemDiscovery {
    pub fn new(source: NeighborSource) -> Self {
        Self { source }
    }
}

impl HostDiscovery for SystemDiscovery {
    async fn neighbors(&self) -> anyhow::Result<Vec<Neighbor>> {
        let text = match self.source {
            NeighborSource::Arp => arp::read_arp_command().await?,
            NeighborSource::Proc => arp::read_proc_net_arp().await?,
        };
        Ok(arp::parse_neighbor_table(&text))
    }

    fn local_subnet(&self) -> Option<Ipv4Network> {
        subnet::local_subnet()
    }

    async fn resolve_hostname(&self, ip: Ipv4Addr) -> String {
        tokio::task::spawn_blocking(move || lookup_hostname(ip))
            .await
            .unwrap_or_default()
    }
}

fn lookup_hostname(ip: Ipv4Addr) -> String {
    match dns_lookup::lookup_addr(&IpAddr::V4(ip)) {
        // Resolvers without a PTR record hand back the numeric form.
        Ok(name) if name != ip.to_string() => name.trim_end_matches('.').to_string(),
        _ => String::new(),
    }
}
