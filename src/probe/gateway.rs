// Best-effort default gateway guess. This does not read the routing table: it assumes the
// gateway is the .1 host of the /24 holding the address the kernel would route through.

use super::tcp_ping;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Address used only to make the kernel pick a route; nothing is sent to it.
const ROUTE_PROBE_ADDR: &str = "8.8.8.8:80";
const VALIDATION_PORTS: [u16; 2] = [80, 53];

pub fn gateway_candidate(local: Ipv4Addr) -> Ipv4Addr {
    let [a, b, c, _] = local.octets();
    Ipv4Addr::new(a, b, c, 1)
}

/// Local IPv4 address of the default route, via a connected (never written) UDP socket.
pub async fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    if let Err(e) = socket.connect(ROUTE_PROBE_ADDR).await {
        tracing::info!(error = %e, "could not detect gateway via UDP dial");
        return None;
    }
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_loopback() => Some(ip),
        _ => None,
    }
}

/// Returns the `.1` candidate only if it accepts a TCP connection on port 80 or 53.
pub async fn detect_gateway(timeout: Duration) -> Option<Ipv4Addr> {
    tracing::info!("detecting gateway IP");
    let candidate = gateway_candidate(local_ipv4().await?);
    validate_gateway(candidate, &VALIDATION_PORTS, timeout).await
}

/// `candidate` if any of `ports` accepts a TCP connection, tried in order.
pub async fn validate_gateway(
    candidate: Ipv4Addr,
    ports: &[u16],
    timeout: Duration,
) -> Option<Ipv4Addr> {
    let host = candidate.to_string();
    for &port in ports {
        if tcp_ping(&host, port, timeout).await.is_ok() {
            tracing::info!(gateway = %candidate, port, "gateway IP found");
            return Some(candidate);
        }
    }
    tracing::info!(candidate = %candidate, "no valid gateway IP found");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_is_dot_one_of_the_slash_24() {
        assert_eq!(
            gateway_candidate(Ipv4Addr::new(192, 168, 4, 37)),
            Ipv4Addr::new(192, 168, 4, 1)
        );
        assert_eq!(
            gateway_candidate(Ipv4Addr::new(10, 0, 0, 1)),
            Ipv4Addr::new(10, 0, 0, 1)
        );
    }

    async fn closed_port() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn candidate_accepted_when_a_later_port_connects() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        let closed = closed_port().await;

        let gateway =
            validate_gateway(Ipv4Addr::LOCALHOST, &[closed, open], Duration::from_secs(2)).await;
        assert_eq!(gateway, Some(Ipv4Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn candidate_rejected_when_no_port_connects() {
        let closed = closed_port().await;
        let gateway = validate_gateway(Ipv4Addr::LOCALHOST, &[closed], Duration::from_secs(2)).await;
        assert_eq!(gateway, None);
    }

    #[tokio::test]
    async fn candidate_rejected_without_ports() {
        let gateway = validate_gateway(Ipv4Addr::LOCALHOST, &[], Duration::from_secs(2)).await;
        assert_eq!(gateway, None);
    }
}
