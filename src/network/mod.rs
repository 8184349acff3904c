//! Network layer - connectivity sampling and quality classification
//!
//! The Network actor samples the host connectivity object and an active
//! latency probe, and sends merged snapshots back to the App layer.

pub mod actor;
pub mod client;
pub mod connectivity;
pub mod stats;

pub use actor::NetworkActor;
pub use client::{HttpProbe, LatencyProbe};
pub use connectivity::{ConnectionInfo, ConnectivitySource, ManualConnectivity, NoConnectivityInfo};
pub use stats::{classify, NetworkStats, Quality, StatsSample};
