// Sequential ping sweep. One external `ping` per host, one host at a time, so a /24 with
// silent hosts can take minutes; the tick loop skips missed ticks meanwhile.

use super::SubnetSweep;
use super::subnet::host_addresses;
use ip_network::Ipv4Network;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;

pub struct PingSweep {
    timeout: Duration,
}

impl PingSweep {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn command(&self, ip: Ipv4Addr) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("ping");
        if cfg!(windows) {
            cmd.args(["-n", "1", "-w"])
                .arg(self.timeout.as_millis().to_string());
        } else if cfg!(target_os = "macos") {
            // BSD ping takes -W in milliseconds.
            cmd.args(["-c", "1", "-W"])
                .arg(self.timeout.as_millis().to_string());
        } else {
            cmd.args(["-c", "1", "-W"])
                .arg(self.timeout.as_secs().max(1).to_string());
        }
        cmd.arg(ip.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// True when a single echo got an answer. Spawn failures count as no answer.
    pub async fn ping_once(&self, ip: Ipv4Addr) -> bool {
        let mut cmd = self.command(ip);
        let status = tokio::time::timeout(self.timeout + Duration::from_secs(1), cmd.status()).await;
        matches!(status, Ok(Ok(s)) if s.success())
    }
}

impl SubnetSweep for PingSweep {
    async fn sweep(&self, subnet: Ipv4Network) -> Vec<Ipv4Addr> {
        let mut active = Vec::new();
        for ip in host_addresses(subnet) {
            if self.ping_once(ip).await {
                active.push(ip);
            }
        }
        tracing::debug!(subnet = %subnet, responders = active.len(), "ping sweep finished");
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Whether the host can run `ping` against loopback at all (binary present and permitted).
    #[cfg(unix)]
    fn system_ping_works() -> bool {
        std::process::Command::new("ping")
            .args(["-c", "1", "127.0.0.1"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn loopback_answers() {
        if !system_ping_works() {
            return;
        }
        let sweep = PingSweep::new(Duration::from_secs(1));
        assert!(sweep.ping_once(Ipv4Addr::LOCALHOST).await);
    }

    #[tokio::test]
    async fn unroutable_documentation_address_does_not_answer() {
        let sweep = PingSweep::new(Duration::from_secs(1));
        assert!(!sweep.ping_once(Ipv4Addr::new(192, 0, 2, 1)).await);
    }

    #[tokio::test]
    async fn sweep_of_silent_subnet_finds_no_responders() {
        let sweep = PingSweep::new(Duration::from_secs(1));
        let subnet = Ipv4Network::new(Ipv4Addr::new(192, 0, 2, 0), 30).unwrap();
        assert!(sweep.sweep(subnet).await.is_empty());
    }
}
