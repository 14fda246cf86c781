// Reachability probe models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a probe reached (or failed to reach) its target.
///
/// TCP latency is handshake time, not an ICMP round trip; consumers can tell the two apart
/// through this label. Serializes as `"ICMP"`, `"TCP:443"` or `"FAILED"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMethod {
    Icmp,
    Tcp(u16),
    Failed,
}

impl ProbeMethod {
    pub fn is_tcp(&self) -> bool {
        matches!(self, ProbeMethod::Tcp(_))
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeMethod::Icmp => f.write_str("ICMP"),
            ProbeMethod::Tcp(port) => write!(f, "TCP:{}", port),
            ProbeMethod::Failed => f.write_str("FAILED"),
        }
    }
}

impl FromStr for ProbeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ICMP" => Ok(ProbeMethod::Icmp),
            "FAILED" => Ok(ProbeMethod::Failed),
            other => other
                .strip_prefix("TCP:")
                .and_then(|p| p.parse().ok())
                .map(ProbeMethod::Tcp)
                .ok_or_else(|| format!("unknown probe method: {}", other)),
        }
    }
}

impl Serialize for ProbeMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProbeMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Durations on the wire are fractional milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(d.as_nanos() as f64 / 1_000_000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(ms / 1000.0).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub latency: Duration,
    pub success: bool,
}

/// Rolling latency and loss for one probe target, keyed by host string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingStats {
    pub host: String,
    #[serde(with = "duration_ms")]
    pub last_latency: Duration,
    /// Mean of the successful latencies still in `history`.
    #[serde(with = "duration_ms")]
    pub avg_latency: Duration,
    /// `failed_pings / total_pings * 100`.
    pub packet_loss: f64,
    pub total_pings: u64,
    pub failed_pings: u64,
    pub history: VecDeque<PingPoint>,
    pub last_updated: DateTime<Utc>,
    pub last_method: ProbeMethod,
}
