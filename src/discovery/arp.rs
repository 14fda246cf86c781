// Neighbor table readers and the line heuristic shared by `arp -a` and /proc/net/arp.

use super::Neighbor;
use std::net::Ipv4Addr;

/// Incomplete entries in /proc/net/arp carry this placeholder.
const ZERO_MAC: &str = "00:00:00:00:00:00";

/// Parses IP/MAC pairs out of neighbor-table text. A line is kept only when it holds a
/// parseable IPv4 address and exactly one token with five colons. Everything else is skipped.
pub fn parse_neighbor_table(output: &str) -> Vec<Neighbor> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Neighbor> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }

    let ip = tokens.iter().find_map(|t| {
        t.trim_matches(|c| c == '(' || c == ')')
            .parse::<Ipv4Addr>()
            .ok()
    })?;

    let mut macs = tokens.iter().filter(|t| t.matches(':').count() == 5);
    let mac = macs.next()?.to_lowercase();
    if macs.next().is_some() || mac == ZERO_MAC {
        return None;
    }

    Some(Neighbor { ip, mac })
}

/// Runs `arp -a` (numeric on Unix so the command itself does not block on DNS).
pub async fn read_arp_command() -> anyhow::Result<String> {
    let mut cmd = tokio::process::Command::new("arp");
    cmd.arg("-a");
    #[cfg(unix)]
    cmd.arg("-n");
    let output = cmd.kill_on_drop(true).output().await?;
    anyhow::ensure!(
        output.status.success(),
        "arp exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    );
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub async fn read_proc_net_arp() -> anyhow::Result<String> {
    Ok(tokio::fs::read_to_string("/proc/net/arp").await?)
}
