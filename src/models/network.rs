// Network interface throughput models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One throughput sample kept in an interface's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub bytes_rx: u64,
    pub bytes_tx: u64,
    /// Receive rate in bytes/sec at the time of the sample.
    pub speed_rx: f64,
    /// Transmit rate in bytes/sec at the time of the sample.
    pub speed_tx: f64,
}

/// Cumulative counters and derived speed for one interface, keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceStats {
    pub name: String,
    pub bytes_rx: u64,
    pub bytes_tx: u64,
    pub packets_rx: u64,
    pub packets_tx: u64,
    /// Bytes/sec since the previous sample. Not clamped: a counter reset yields a negative value.
    pub speed_rx: f64,
    pub speed_tx: f64,
    pub history: VecDeque<DataPoint>,
    pub last_check: DateTime<Utc>,
}

impl InterfaceStats {
    pub(crate) fn new(name: &str, counters: InterfaceCounters, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            bytes_rx: counters.bytes_rx,
            bytes_tx: counters.bytes_tx,
            packets_rx: counters.packets_rx,
            packets_tx: counters.packets_tx,
            speed_rx: 0.0,
            speed_tx: 0.0,
            history: VecDeque::new(),
            last_check: now,
        }
    }
}

/// Raw cumulative counters read from the OS for one interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub bytes_rx: u64,
    pub bytes_tx: u64,
    pub packets_rx: u64,
    pub packets_tx: u64,
}
