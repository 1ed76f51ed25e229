// Domain models

mod history;
mod snapshot;

pub use history::{
    HistoricalCpu, HistoricalDisk, HistoricalMemory, HistoricalRuntime, HistoricalStats,
};
pub use snapshot::{
    CpuInfo, DiskUsage, HostInfo, MemoryStats, NetworkStats, RuntimeStats,
    SNAPSHOT_SCHEMA_VERSION, Snapshot, SwapStats,
};
