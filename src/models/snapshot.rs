// Point-in-time snapshot: host, process, runtime and network-delta metrics.

use serde::{Deserialize, Serialize};

/// Current payload schema. Bump when a field consumed by history readers changes.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Identity of one logical core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    pub cpu: u32,
    pub vendor_id: String,
    pub model_name: String,
    pub mhz: u64,
}

/// Host virtual memory. `used_percent` is 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapStats {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

/// Usage of the root filesystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub path: String,
    pub fstype: String,
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub uptime: u64,
    pub boot_time: u64,
    pub procs: u64,
    pub os: String,
    pub platform: String,
    pub platform_version: String,
    pub kernel_version: String,
    pub kernel_arch: String,
    pub host_id: String,
}

/// Heap statistics of this process. `num_gc` is always 0; there is no collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStats {
    pub alloc: u64,
    pub total_alloc: u64,
    pub sys: u64,
    pub num_gc: u32,
}

/// Network I/O since the previous sample, plus the raw cumulative counters it was computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub packets_received: u64,
    pub packets_sent: u64,
    #[serde(default)]
    pub total_bytes_received: u64,
    #[serde(default)]
    pub total_bytes_sent: u64,
    #[serde(default)]
    pub total_packets_received: u64,
    #[serde(default)]
    pub total_packets_sent: u64,
}

/// One sampling tick. Written once, stored as JSON, decoded again by history readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Missing in payloads written before versioning; reads as 0.
    #[serde(default)]
    pub schema_version: u32,
    pub cpu: Vec<CpuInfo>,
    pub cpu_percent: f64,
    pub process_cpu_percent: f64,
    pub process_memory_percent: f32,
    pub process_memory_absolute: f64,
    pub memory: MemoryStats,
    pub swap: SwapStats,
    pub disk: DiskUsage,
    pub host: HostInfo,
    pub runtime: RuntimeStats,
    pub network_stats: NetworkStats,
}
