//! Network health: probes, connectivity tracking and the render snapshot.

pub mod probe;
pub mod tracker;
pub mod types;

pub use probe::{parse_ping_latency, NetworkProbe, SystemProbe};
pub use tracker::{ConnectivityEdge, HealthTracker, NotificationIntent};
pub use types::{HealthSnapshot, HttpOutcome, LatencyLevel, PingOutcome, ProbeResult, SpeedRating};
