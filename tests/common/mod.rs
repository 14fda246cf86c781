// Shared test helpers: fixed clock and fakes for the collector seams

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use ip_network::Ipv4Network;
use netmonitor::collector::traffic::CounterSource;
use netmonitor::discovery::{HostDiscovery, Neighbor, SubnetSweep};
use netmonitor::models::InterfaceCounters;
use netmonitor::probe::{ProbeError, Prober};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn counters(bytes_rx: u64, bytes_tx: u64) -> InterfaceCounters {
    InterfaceCounters {
        bytes_rx,
        bytes_tx,
        packets_rx: bytes_rx / 100,
        packets_tx: bytes_tx / 100,
    }
}

/// Counter source returning a fixed list, or an error when `counters` is `None`.
pub struct FakeCounters {
    pub counters: Mutex<Option<Vec<(String, InterfaceCounters)>>>,
    pub calls: AtomicUsize,
}

impl FakeCounters {
    pub fn new(counters: Option<Vec<(String, InterfaceCounters)>>) -> Self {
        Self {
            counters: Mutex::new(counters),
            calls: AtomicUsize::new(0),
        }
    }
}

impl CounterSource for FakeCounters {
    async fn interface_counters(&self) -> anyhow::Result<Vec<(String, InterfaceCounters)>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.counters
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("counters unavailable"))
    }
}

/// ICMP answers with `icmp` (or times out); TCP answers only on the ports in `tcp`.
pub struct FakeProber {
    pub icmp: Option<Duration>,
    pub tcp: HashMap<u16, Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProber {
    pub fn new(icmp: Option<Duration>, tcp: &[(u16, Duration)]) -> Self {
        Self {
            icmp,
            tcp: tcp.iter().copied().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Prober for FakeProber {
    async fn icmp_echo(&self, host: &str) -> Result<Duration, ProbeError> {
        self.calls.lock().unwrap().push(format!("icmp {}", host));
        self.icmp.ok_or(ProbeError::Timeout(Duration::from_secs(5)))
    }

    async fn tcp_connect(&self, host: &str, port: u16) -> Result<Duration, ProbeError> {
        self.calls.lock().unwrap().push(format!("tcp {}:{}", host, port));
        self.tcp
            .get(&port)
            .copied()
            .ok_or_else(|| ProbeError::ConnectTimeout(format!("{}:{}", host, port)))
    }
}

pub struct FakeDiscovery {
    /// `None` makes the neighbor table read fail.
    pub neighbors: Option<Vec<Neighbor>>,
    pub subnet: Option<Ipv4Network>,
    pub hostnames: Mutex<HashMap<Ipv4Addr, String>>,
    pub lookups: Mutex<Vec<Ipv4Addr>>,
}

impl FakeDiscovery {
    pub fn new(neighbors: Option<Vec<Neighbor>>, subnet: Option<Ipv4Network>) -> Self {
        Self {
            neighbors,
            subnet,
            hostnames: Mutex::new(HashMap::new()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn set_hostname(&self, ip: Ipv4Addr, name: &str) {
        self.hostnames.lock().unwrap().insert(ip, name.to_string());
    }
}

impl HostDiscovery for FakeDiscovery {
    async fn neighbors(&self) -> anyhow::Result<Vec<Neighbor>> {
        self.neighbors
            .clone()
            .ok_or_else(|| anyhow::anyhow!("arp: command not found"))
    }

    fn local_subnet(&self) -> Option<Ipv4Network> {
        self.subnet
    }

    async fn resolve_hostname(&self, ip: Ipv4Addr) -> String {
        self.lookups.lock().unwrap().push(ip);
        self.hostnames
            .lock()
            .unwrap()
            .get(&ip)
            .cloned()
            .unwrap_or_default()
    }
}

pub struct FakeSweep {
    pub responders: Vec<Ipv4Addr>,
    pub calls: AtomicUsize,
}

impl FakeSweep {
    pub fn new(responders: Vec<Ipv4Addr>) -> Self {
        Self {
            responders,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SubnetSweep for FakeSweep {
    async fn sweep(&self, _subnet: Ipv4Network) -> Vec<Ipv4Addr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responders.clone()
    }
}

pub fn lan() -> Ipv4Network {
    Ipv4Network::new(Ipv4Addr::new(192, 168, 1, 0), 24).unwrap()
}

pub fn neighbor(last_octet: u8, mac: &str) -> Neighbor {
    Neighbor {
        ip: Ipv4Addr::new(192, 168, 1, last_octet),
        mac: mac.to_string(),
    }
}
