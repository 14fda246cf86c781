// Reachability probing: ICMP echo first, TCP connect fallback over an ordered port list.

pub mod gateway;

use crate::models::ProbeMethod;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError};
use tokio::net::TcpStream;
use tokio::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("resolve {host}: {reason}")]
    Resolve { host: String, reason: String },
    #[error("open ICMP socket (may need root/CAP_NET_RAW): {0}")]
    Socket(#[source] std::io::Error),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("ICMP echo: {0}")]
    Icmp(#[source] SurgeError),
    #[error("TCP connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TCP connect to {0} timed out")]
    ConnectTimeout(String),
    #[error("both ICMP and TCP ping failed")]
    AllFailed,
}

impl ProbeError {
    /// Folds a surge-ping failure into a probe error; its per-sequence timeout becomes `Timeout`.
    pub fn from_echo(err: SurgeError, timeout: Duration) -> Self {
        match err {
            SurgeError::Timeout { .. } => ProbeError::Timeout(timeout),
            other => ProbeError::Icmp(other),
        }
    }
}

/// The two primitive probes. Latency is measured from send/dial start to verified reply or
/// established connection.
pub trait Prober: Send + Sync + 'static {
    fn icmp_echo(&self, host: &str) -> impl Future<Output = Result<Duration, ProbeError>> + Send;

    fn tcp_connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<Duration, ProbeError>> + Send;
}

/// Result of one probe pass against one target.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub host: String,
    /// Present only on success.
    pub latency: Option<Duration>,
    pub method: ProbeMethod,
    /// Last failure seen; for a TCP success this is why ICMP failed.
    pub error: Option<ProbeError>,
}

impl ProbeOutcome {
    pub fn success(&self) -> bool {
        self.latency.is_some()
    }
}

/// ICMP once, then TCP on each port in order until one connects.
pub async fn probe_host<P: Prober>(prober: &P, host: &str, tcp_ports: &[u16]) -> ProbeOutcome {
    let icmp_err = match prober.icmp_echo(host).await {
        Ok(rtt) => {
            return ProbeOutcome {
                host: host.to_string(),
                latency: Some(rtt),
                method: ProbeMethod::Icmp,
                error: None,
            };
        }
        Err(e) => e,
    };
    tracing::debug!(host, error = %icmp_err, "ICMP ping failed, trying TCP fallback");

    for &port in tcp_ports {
        match prober.tcp_connect(host, port).await {
            Ok(rtt) => {
                return ProbeOutcome {
                    host: host.to_string(),
                    latency: Some(rtt),
                    method: ProbeMethod::Tcp(port),
                    error: Some(icmp_err),
                };
            }
            Err(e) => tracing::trace!(host, port, error = %e, "TCP probe failed"),
        }
    }

    ProbeOutcome {
        host: host.to_string(),
        latency: None,
        method: ProbeMethod::Failed,
        error: Some(ProbeError::AllFailed),
    }
}

/// Resolves `host` to its first IPv4 address.
pub async fn resolve_ipv4(host: &str) -> Result<Ipv4Addr, ProbeError> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }
    let resolve_err = |reason: String| ProbeError::Resolve {
        host: host.to_string(),
        reason,
    };
    tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| resolve_err(e.to_string()))?
        .find_map(|a| match a {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .ok_or_else(|| resolve_err("no IPv4 address".into()))
}

/// Time to an established TCP connection to `host:port`, bounded by `timeout`.
pub async fn tcp_ping(host: &str, port: u16, timeout: Duration) -> Result<Duration, ProbeError> {
    let addr = format!("{}:{}", host, port);
    let start = Instant::now();
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => Ok(start.elapsed()),
        Ok(Err(source)) => Err(ProbeError::Connect { addr, source }),
        Err(_) => Err(ProbeError::ConnectTimeout(addr)),
    }
}

const ECHO_PAYLOAD: [u8; 56] = [0; 56];

/// Echo identifier: the process id truncated to 16 bits.
fn process_identifier() -> PingIdentifier {
    PingIdentifier((std::process::id() & 0xffff) as u16)
}

/// Real network prober: surge-ping ICMP client, tokio TCP connect.
pub struct SystemProber {
    /// `None` when no ICMP socket could be opened; every echo then fails and TCP takes over.
    client: Option<Client>,
    icmp_timeout: Duration,
    tcp_timeout: Duration,
    sequence: AtomicU16,
}

impl SystemProber {
    /// Opens the ICMP client. Must be called inside a tokio runtime.
    pub fn new(icmp_timeout: Duration, tcp_timeout: Duration) -> Self {
        let client = match Client::new(&Config::default()) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "icmp_client",
                    "ICMP unavailable (needs CAP_NET_RAW or ping_group_range); using TCP only"
                );
                None
            }
        };
        Self {
            client,
            icmp_timeout,
            tcp_timeout,
            sequence: AtomicU16::new(1),
        }
    }

    pub fn icmp_available(&self) -> bool {
        self.client.is_some()
    }
}

impl Prober for SystemProber {
    /// One echo request, one wait bounded by the ICMP timeout, no retry.
    async fn icmp_echo(&self, host: &str) -> Result<Duration, ProbeError> {
        let Some(client) = &self.client else {
            return Err(ProbeError::Socket(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "ICMP client not available",
            )));
        };
        let target = resolve_ipv4(host).await?;
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);

        let mut pinger = client
            .pinger(IpAddr::V4(target), process_identifier())
            .await;
        pinger.timeout(self.icmp_timeout);
        let (_reply, rtt) = pinger
            .ping(PingSequence(seq), &ECHO_PAYLOAD)
            .await
            .map_err(|e| ProbeError::from_echo(e, self.icmp_timeout))?;
        Ok(rtt)
    }

    async fn tcp_connect(&self, host: &str, port: u16) -> Result<Duration, ProbeError> {
        tcp_ping(host, port, self.tcp_timeout).await
    }
}
