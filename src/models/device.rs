// Discovered LAN device model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub ip: String,
    /// Empty when the device was only seen by the ping sweep.
    pub mac: String,
    pub hostname: String,
    pub last_seen: DateTime<Utc>,
    /// Stored as true on every sighting; snapshots override it with the age check.
    pub is_active: bool,
}
