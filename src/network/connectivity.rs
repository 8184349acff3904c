//! Host connectivity information (downlink estimate, connection type, rtt)

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::network::stats::StatsSample;

/// What the host reports about the current connection
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Estimated downlink in Mbps
    pub downlink: Option<f64>,
    pub effective_type: Option<String>,
    /// Estimated round trip in ms
    pub rtt: Option<u32>,
}

impl ConnectionInfo {
    pub fn to_sample(&self, observed_at: chrono::DateTime<chrono::Utc>) -> StatsSample {
        StatsSample {
            downlink_mbps: self.downlink,
            effective_type: self.effective_type.clone(),
            rtt_ms: self.rtt,
            observed_at,
        }
    }
}

/// Passive source of connectivity information.
///
/// Either part may be unavailable: `current` returns `None` when the host
/// has no connectivity object, `changes` returns `None` when it cannot
/// notify about changes.
pub trait ConnectivitySource: Send + Sync + 'static {
    fn current(&self) -> Option<ConnectionInfo>;

    /// Register for change notifications. Dropping the receiver releases
    /// the registration.
    fn changes(&self) -> Option<broadcast::Receiver<()>>;
}

/// Terminal hosts expose no connectivity object
#[derive(Clone, Copy, Debug, Default)]
pub struct NoConnectivityInfo;

impl ConnectivitySource for NoConnectivityInfo {
    fn current(&self) -> Option<ConnectionInfo> {
        None
    }

    fn changes(&self) -> Option<broadcast::Receiver<()>> {
        None
    }
}

/// Connectivity values set explicitly (from settings, or by tests)
#[derive(Clone)]
pub struct ManualConnectivity {
    info: Arc<Mutex<ConnectionInfo>>,
    change_tx: broadcast::Sender<()>,
}

impl ManualConnectivity {
    pub fn new(info: ConnectionInfo) -> Self {
        let (change_tx, _) = broadcast::channel(16);
        ManualConnectivity {
            info: Arc::new(Mutex::new(info)),
            change_tx,
        }
    }

    /// Replace the reported values and notify registered listeners
    pub fn set(&self, info: ConnectionInfo) {
        *self.info.lock() = info;
        let _ = self.change_tx.send(());
    }

    /// Number of live change registrations
    pub fn listener_count(&self) -> usize {
        self.change_tx.receiver_count()
    }
}

impl ConnectivitySource for ManualConnectivity {
    fn current(&self) -> Option<ConnectionInfo> {
        Some(self.info.lock().clone())
    }

    fn changes(&self) -> Option<broadcast::Receiver<()>> {
        Some(self.change_tx.subscribe())
    }
}
