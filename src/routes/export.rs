// CSV renderings of store snapshots (history rows for traffic/ping, one row per device).

use crate::models::{Device, InterfaceStats, PingStats};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Traffic,
    Devices,
    Ping,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Traffic => "traffic",
            ExportKind::Devices => "devices",
            ExportKind::Ping => "ping",
        }
    }
}

impl FromStr for ExportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traffic" => Ok(ExportKind::Traffic),
            "devices" => Ok(ExportKind::Devices),
            "ping" => Ok(ExportKind::Ping),
            other => anyhow::bail!("invalid export type: {}", other),
        }
    }
}

fn sorted<V>(map: &HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn finish(writer: csv::Writer<Vec<u8>>) -> anyhow::Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush: {}", e))
}

pub fn traffic_csv(interfaces: &HashMap<String, InterfaceStats>) -> anyhow::Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "Timestamp",
        "Interface",
        "Bytes_RX",
        "Bytes_TX",
        "Speed_RX",
        "Speed_TX",
    ])?;
    for (name, iface) in sorted(interfaces) {
        for point in &iface.history {
            w.write_record([
                point.timestamp.to_rfc3339(),
                name.clone(),
                point.bytes_rx.to_string(),
                point.bytes_tx.to_string(),
                format!("{:.2}", point.speed_rx),
                format!("{:.2}", point.speed_tx),
            ])?;
        }
    }
    finish(w)
}

pub fn devices_csv(devices: &HashMap<String, Device>) -> anyhow::Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(["IP", "MAC", "Hostname", "Last_Seen", "Active"])?;
    for (_, d) in sorted(devices) {
        w.write_record([
            d.ip.clone(),
            d.mac.clone(),
            d.hostname.clone(),
            d.last_seen.to_rfc3339(),
            d.is_active.to_string(),
        ])?;
    }
    finish(w)
}

pub fn ping_csv(pings: &HashMap<String, PingStats>) -> anyhow::Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(["Timestamp", "Host", "Latency_MS", "Success"])?;
    for (host, stats) in sorted(pings) {
        for point in &stats.history {
            w.write_record([
                point.timestamp.to_rfc3339(),
                host.clone(),
                format!("{:.2}", point.latency.as_secs_f64() * 1000.0),
                point.success.to_string(),
            ])?;
        }
    }
    finish(w)
}
