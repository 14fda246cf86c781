// In-memory telemetry store. Interfaces, devices and probe targets share one RwLock;
// mutations take it exclusively, snapshots take it shared and hand back owned copies.

use crate::models::{
    DataPoint, Device, InterfaceCounters, InterfaceStats, LiveData, PingPoint, PingStats,
    ProbeMethod,
};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Upper bound on per-entity history (interfaces and probe targets).
pub const MAX_HISTORY_POINTS: usize = 100;

/// A device counts as active while it was seen less than this long ago.
pub const DEVICE_ACTIVE_WINDOW: Duration = Duration::from_secs(5 * 60);

struct Inner {
    interfaces: HashMap<String, InterfaceStats>,
    devices: HashMap<String, Device>,
    pings: HashMap<String, PingStats>,
    last_updated: DateTime<Utc>,
}

pub struct Store {
    inner: RwLock<Inner>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                interfaces: HashMap::new(),
                devices: HashMap::new(),
                pings: HashMap::new(),
                last_updated: Utc::now(),
            }),
        }
    }

    pub fn update_interface(
        &self,
        name: &str,
        bytes_rx: u64,
        bytes_tx: u64,
        packets_rx: u64,
        packets_tx: u64,
    ) {
        let counters = InterfaceCounters {
            bytes_rx,
            bytes_tx,
            packets_rx,
            packets_tx,
        };
        self.update_interface_at(name, counters, Utc::now());
    }

    /// Records a counter sample taken at `now`. Speed is only derived when a previous sample
    /// exists and strictly less time than `now` has passed since it.
    pub fn update_interface_at(&self, name: &str, counters: InterfaceCounters, now: DateTime<Utc>) {
        let mut inner = self.inner.write();

        match inner.interfaces.get_mut(name) {
            Some(iface) => {
                let elapsed = seconds_between(iface.last_check, now);
                if elapsed > 0.0 {
                    iface.speed_rx = (counters.bytes_rx as f64 - iface.bytes_rx as f64) / elapsed;
                    iface.speed_tx = (counters.bytes_tx as f64 - iface.bytes_tx as f64) / elapsed;
                }

                iface.history.push_back(DataPoint {
                    timestamp: now,
                    bytes_rx: counters.bytes_rx,
                    bytes_tx: counters.bytes_tx,
                    speed_rx: iface.speed_rx,
                    speed_tx: iface.speed_tx,
                });
                truncate_front(&mut iface.history);

                iface.bytes_rx = counters.bytes_rx;
                iface.bytes_tx = counters.bytes_tx;
                iface.packets_rx = counters.packets_rx;
                iface.packets_tx = counters.packets_tx;
                iface.last_check = now;
            }
            None => {
                inner
                    .interfaces
                    .insert(name.to_string(), InterfaceStats::new(name, counters, now));
            }
        }

        inner.last_updated = now;
    }

    pub fn update_device(&self, ip: &str, mac: &str, hostname: &str) {
        self.update_device_at(ip, mac, hostname, Utc::now());
    }

    /// Marks a device as seen. MAC and hostname are first-write-wins: once non-empty they are
    /// never replaced, neither by an empty value nor by a different one. Does not move the
    /// store-wide `last_updated`.
    pub fn update_device_at(&self, ip: &str, mac: &str, hostname: &str, now: DateTime<Utc>) {
        let mut inner = self.inner.write();

        match inner.devices.get_mut(ip) {
            Some(device) => {
                device.last_seen = now;
                device.is_active = true;
                if !hostname.is_empty() && device.hostname.is_empty() {
                    device.hostname = hostname.to_string();
                }
                if !mac.is_empty() && device.mac.is_empty() {
                    device.mac = mac.to_string();
                }
            }
            None => {
                inner.devices.insert(
                    ip.to_string(),
                    Device {
                        ip: ip.to_string(),
                        mac: mac.to_string(),
                        hostname: hostname.to_string(),
                        last_seen: now,
                        is_active: true,
                    },
                );
            }
        }
    }

    pub fn record_probe(&self, host: &str, latency: Duration, success: bool, method: ProbeMethod) {
        self.record_probe_at(host, latency, success, method, Utc::now());
    }

    /// Folds one probe sample into the target's stats. Failed samples count towards loss and
    /// history but never touch `last_latency` or `avg_latency`. A successful sample averages
    /// over the retained successes plus itself, before the oldest point is evicted.
    pub fn record_probe_at(
        &self,
        host: &str,
        latency: Duration,
        success: bool,
        method: ProbeMethod,
        now: DateTime<Utc>,
    ) {
        let mut inner = self.inner.write();
        let point = PingPoint {
            timestamp: now,
            latency,
            success,
        };

        match inner.pings.get_mut(host) {
            Some(stats) => {
                stats.total_pings += 1;
                if success {
                    stats.last_latency = latency;
                } else {
                    stats.failed_pings += 1;
                }
                stats.packet_loss = loss_percent(stats.failed_pings, stats.total_pings);
                if success {
                    stats.avg_latency = mean_success_latency(&stats.history, latency);
                }

                stats.history.push_back(point);
                truncate_front(&mut stats.history);

                stats.last_updated = now;
                stats.last_method = method;
            }
            None => {
                let seeded = if success { latency } else { Duration::ZERO };
                let failed_pings = u64::from(!success);
                inner.pings.insert(
                    host.to_string(),
                    PingStats {
                        host: host.to_string(),
                        last_latency: seeded,
                        avg_latency: seeded,
                        packet_loss: loss_percent(failed_pings, 1),
                        total_pings: 1,
                        failed_pings,
                        history: VecDeque::from([point]),
                        last_updated: now,
                        last_method: method,
                    },
                );
            }
        }

        inner.last_updated = now;
    }

    pub fn snapshot_interfaces(&self) -> HashMap<String, InterfaceStats> {
        self.inner.read().interfaces.clone()
    }

    pub fn snapshot_devices(&self) -> HashMap<String, Device> {
        self.snapshot_devices_at(Utc::now())
    }

    /// Device copies with `is_active` recomputed against `now`; stored state is left as is.
    pub fn snapshot_devices_at(&self, now: DateTime<Utc>) -> HashMap<String, Device> {
        devices_as_of(&self.inner.read().devices, now)
    }

    pub fn snapshot_pings(&self) -> HashMap<String, PingStats> {
        self.inner.read().pings.clone()
    }

    pub fn live_data(&self) -> LiveData {
        self.live_data_at(Utc::now())
    }

    /// All three snapshots taken under a single shared lock, so the totals agree with the maps.
    pub fn live_data_at(&self, now: DateTime<Utc>) -> LiveData {
        let inner = self.inner.read();
        LiveData::from_snapshots(
            now,
            inner.interfaces.clone(),
            devices_as_of(&inner.devices, now),
            inner.pings.clone(),
        )
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.inner.read().last_updated
    }

    /// (interfaces, devices, probe targets) currently tracked.
    pub fn sizes(&self) -> (usize, usize, usize) {
        let inner = self.inner.read();
        (inner.interfaces.len(), inner.devices.len(), inner.pings.len())
    }
}

fn devices_as_of(devices: &HashMap<String, Device>, now: DateTime<Utc>) -> HashMap<String, Device> {
    let window = TimeDelta::from_std(DEVICE_ACTIVE_WINDOW).unwrap_or(TimeDelta::MAX);
    devices
        .iter()
        .map(|(ip, device)| {
            let mut device = device.clone();
            device.is_active = now - device.last_seen < window;
            (ip.clone(), device)
        })
        .collect()
}

fn truncate_front<T>(history: &mut VecDeque<T>) {
    while history.len() > MAX_HISTORY_POINTS {
        history.pop_front();
    }
}

fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let delta = later - earlier;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

fn loss_percent(failed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    failed as f64 / total as f64 * 100.0
}

fn mean_success_latency(history: &VecDeque<PingPoint>, latest: Duration) -> Duration {
    let (sum, count) = history
        .iter()
        .filter(|p| p.success)
        .fold((latest, 1u32), |(sum, count), p| (sum + p.latency, count + 1));
    sum / count
}
