// Historical series projected out of stored snapshots.
// All four series are index-aligned: entry i in each comes from the same stored record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalCpu {
    pub percent: f64,
    pub process_percent: f64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalMemory {
    pub used: f64,
    pub total: f64,
    pub usage: f64,
    pub process_percent: f32,
    pub process_absolute: f64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDisk {
    pub total: f64,
    pub used: f64,
    pub usage: f64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRuntime {
    pub alloc: f64,
    pub total_alloc: f64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalStats {
    pub cpu: Vec<HistoricalCpu>,
    pub memory: Vec<HistoricalMemory>,
    pub disk: Vec<HistoricalDisk>,
    pub runtime: Vec<HistoricalRuntime>,
}

impl HistoricalStats {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            cpu: Vec::with_capacity(n),
            memory: Vec::with_capacity(n),
            disk: Vec::with_capacity(n),
            runtime: Vec::with_capacity(n),
        }
    }

    /// Number of source records (every series has this length).
    pub fn len(&self) -> usize {
        self.cpu.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cpu.is_empty()
    }
}
