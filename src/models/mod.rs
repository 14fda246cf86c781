// Domain models: interface throughput, devices, probe targets, live aggregate

mod device;
mod live;
mod network;
mod ping;

pub use device::Device;
pub use live::LiveData;
pub use network::{DataPoint, InterfaceCounters, InterfaceStats};
pub use ping::{PingPoint, PingStats, ProbeMethod};
