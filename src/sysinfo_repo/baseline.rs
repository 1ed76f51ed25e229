// Network baseline: last raw cumulative counters, used to turn counters into per-tick deltas.

use std::sync::{Mutex, PoisonError};

use crate::models::NetworkStats;

/// Raw cumulative network counters, summed over all interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
}

/// Owned by the service, shared by every sampling call (scheduler tick and API requests).
/// Starts empty; the first sample after startup reports zero deltas.
#[derive(Debug, Default)]
pub struct NetworkBaseline {
    prev: Mutex<Option<NetCounters>>,
}

impl NetworkBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes deltas against the stored counters and replaces them with `current`.
    /// A counter lower than its baseline (reset, wraparound, interface gone) yields 0.
    pub fn advance(&self, current: NetCounters) -> NetworkStats {
        let mut guard = self.prev.lock().unwrap_or_else(PoisonError::into_inner);
        let delta = match *guard {
            Some(prev) => NetCounters {
                bytes_sent: current.bytes_sent.saturating_sub(prev.bytes_sent),
                bytes_recv: current.bytes_recv.saturating_sub(prev.bytes_recv),
                packets_sent: current.packets_sent.saturating_sub(prev.packets_sent),
                packets_recv: current.packets_recv.saturating_sub(prev.packets_recv),
            },
            None => NetCounters::default(),
        };
        *guard = Some(current);
        drop(guard);

        NetworkStats {
            bytes_received: delta.bytes_recv,
            bytes_sent: delta.bytes_sent,
            packets_received: delta.packets_recv,
            packets_sent: delta.packets_sent,
            total_bytes_received: current.bytes_recv,
            total_bytes_sent: current.bytes_sent,
            total_packets_received: current.packets_recv,
            total_packets_sent: current.packets_sent,
        }
    }

    /// Counters stored by the most recent sample, if any.
    pub fn current(&self) -> Option<NetCounters> {
        *self.prev.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
