//! Connectivity probes

use std::sync::atomic::{AtomicBool, Ordering};

use crate::ports::NetworkStatus;

/// Assumes the network is always reachable; failures surface as request errors
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

impl NetworkStatus for AlwaysOnline {
    fn is_connected(&self) -> bool {
        true
    }
}

/// Connectivity flag that can be flipped at runtime
#[derive(Debug)]
pub struct ManualNetworkStatus {
    connected: AtomicBool,
}

impl ManualNetworkStatus {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

impl Default for ManualNetworkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NetworkStatus for ManualNetworkStatus {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
