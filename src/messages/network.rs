//! Network messages - communication between App and Network layers

use crate::network::stats::NetworkStats;

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    /// Take a full sample now, outside the timer schedule
    Resample,
    /// Stop sampling and release the timer and change registration
    Shutdown,
}

/// Which trigger produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSource {
    /// Passive read of the host connectivity object
    Connectivity,
    /// Active latency probe
    Probe,
}

/// Snapshot sent from Network layer to App layer after every merge
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkUpdate {
    pub stats: NetworkStats,
    pub source: SampleSource,
}
