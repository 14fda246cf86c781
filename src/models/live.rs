// Live aggregate pushed to WebSocket clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Device, InterfaceStats, PingStats};

/// Point-in-time view of the whole store plus a few derived totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveData {
    pub timestamp: DateTime<Utc>,
    pub interfaces: HashMap<String, InterfaceStats>,
    pub devices: HashMap<String, Device>,
    pub pings: HashMap<String, PingStats>,
    pub active_devices: usize,
    pub total_devices: usize,
    /// Sum of `speed_rx` over all interfaces (bytes/sec).
    pub total_rx: f64,
    pub total_tx: f64,
}

impl LiveData {
    pub fn from_snapshots(
        timestamp: DateTime<Utc>,
        interfaces: HashMap<String, InterfaceStats>,
        devices: HashMap<String, Device>,
        pings: HashMap<String, PingStats>,
    ) -> Self {
        let active_devices = devices.values().filter(|d| d.is_active).count();
        let total_devices = devices.len();
        let total_rx = interfaces.values().map(|i| i.speed_rx).sum();
        let total_tx = interfaces.values().map(|i| i.speed_tx).sum();
        Self {
            timestamp,
            interfaces,
            devices,
            pings,
            active_devices,
            total_devices,
            total_rx,
            total_tx,
        }
    }
}
