use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collectors: CollectorsConfig,
    pub probe: ProbeConfig,
    pub discovery: DiscoveryConfig,
    pub publishing: PublishingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".into(),
        }
    }
}

/// Tick periods of the three collectors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorsConfig {
    pub traffic_interval_ms: u64,
    pub discovery_interval_ms: u64,
    pub ping_interval_ms: u64,
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            traffic_interval_ms: 2_000,
            discovery_interval_ms: 10_000,
            ping_interval_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Hosts probed every tick, in order. The detected gateway (if any) is prepended.
    pub targets: Vec<String>,
    /// TCP fallback ports, tried in order until one connects.
    pub tcp_ports: Vec<u16>,
    pub tcp_timeout_ms: u64,
    pub icmp_timeout_ms: u64,
    pub detect_gateway: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            targets: vec!["8.8.8.8".into(), "1.1.1.1".into(), "127.0.0.1".into()],
            tcp_ports: vec![80, 443, 53, 22],
            tcp_timeout_ms: 3_000,
            icmp_timeout_ms: 5_000,
            detect_gateway: true,
        }
    }
}

/// Where the neighbor (ARP) table is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborSource {
    /// `arp -a` subprocess.
    #[default]
    Arp,
    /// `/proc/net/arp` (Linux only).
    Proc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub neighbor_source: NeighborSource,
    pub sweep_enabled: bool,
    /// Per-host timeout of the sequential ping sweep.
    pub sweep_timeout_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            neighbor_source: NeighborSource::Arp,
            sweep_enabled: true,
            sweep_timeout_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    /// Period of the live-data push to /ws clients.
    pub live_interval_ms: u64,
    /// Max number of live snapshots kept in the broadcast channel (slow clients may lag).
    pub broadcast_capacity: usize,
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            live_interval_ms: 2_000,
            broadcast_capacity: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// How often to log app stats (ws clients, store sizes) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Loads `CONFIG_FILE` (default `config.toml`). A missing file means built-in defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path, "config file not found, using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(anyhow::anyhow!("read {}: {}", path, e)),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.collectors.traffic_interval_ms > 0,
            "collectors.traffic_interval_ms must be > 0, got {}",
            self.collectors.traffic_interval_ms
        );
        anyhow::ensure!(
            self.collectors.discovery_interval_ms > 0,
            "collectors.discovery_interval_ms must be > 0, got {}",
            self.collectors.discovery_interval_ms
        );
        anyhow::ensure!(
            self.collectors.ping_interval_ms > 0,
            "collectors.ping_interval_ms must be > 0, got {}",
            self.collectors.ping_interval_ms
        );
        anyhow::ensure!(
            self.probe.targets.iter().all(|t| !t.trim().is_empty()),
            "probe.targets must not contain empty hosts"
        );
        anyhow::ensure!(
            self.probe.tcp_ports.iter().all(|p| *p > 0),
            "probe.tcp_ports must be between 1 and 65535"
        );
        anyhow::ensure!(
            self.probe.tcp_timeout_ms > 0,
            "probe.tcp_timeout_ms must be > 0, got {}",
            self.probe.tcp_timeout_ms
        );
        anyhow::ensure!(
            self.probe.icmp_timeout_ms > 0,
            "probe.icmp_timeout_ms must be > 0, got {}",
            self.probe.icmp_timeout_ms
        );
        anyhow::ensure!(
            self.discovery.sweep_timeout_ms > 0,
            "discovery.sweep_timeout_ms must be > 0, got {}",
            self.discovery.sweep_timeout_ms
        );
        anyhow::ensure!(
            self.publishing.live_interval_ms > 0,
            "publishing.live_interval_ms must be > 0, got {}",
            self.publishing.live_interval_ms
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
