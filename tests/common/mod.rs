// Shared test helpers

#![allow(dead_code)]

use hoststats::history_repo::{HistoryRepo, payload};
use hoststats::models::*;
use tempfile::TempDir;

pub async fn temp_repo() -> (TempDir, HistoryRepo) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.db");
    let repo = HistoryRepo::connect(path.to_str().unwrap(), 2).await.unwrap();
    repo.init().await.unwrap();
    (dir, repo)
}

/// Snapshot whose scalar fields are all derived from `n`, so series entries can be told apart.
pub fn snapshot_with(n: u64) -> Snapshot {
    Snapshot {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        cpu: vec![CpuInfo {
            cpu: 0,
            vendor_id: "GenuineIntel".into(),
            model_name: "test".into(),
            mhz: 2400,
        }],
        cpu_percent: n as f64,
        process_cpu_percent: n as f64 / 10.0,
        process_memory_percent: 1.5,
        process_memory_absolute: (n * 1000) as f64,
        memory: MemoryStats {
            total: 16_000,
            available: 16_000 - n * 100,
            used: n * 100,
            used_percent: (n * 100) as f64 / 160.0,
        },
        swap: SwapStats {
            total: 0,
            used: 0,
            free: 0,
            used_percent: 0.0,
        },
        disk: DiskUsage {
            path: "/".into(),
            fstype: "ext4".into(),
            total: 1_000_000,
            free: 1_000_000 - n,
            used: n,
            used_percent: n as f64 / 10_000.0,
        },
        host: HostInfo {
            hostname: "test-host".into(),
            uptime: 10,
            boot_time: 1_700_000_000,
            procs: 42,
            os: "linux".into(),
            platform: "debian".into(),
            platform_version: "12".into(),
            kernel_version: "6.1.0".into(),
            kernel_arch: "x86_64".into(),
            host_id: "abc".into(),
        },
        runtime: RuntimeStats {
            alloc: n * 10,
            total_alloc: n * 20,
            sys: 4096,
            num_gc: 0,
        },
        network_stats: NetworkStats::default(),
    }
}

pub fn payload_with(n: u64) -> String {
    payload::encode(&snapshot_with(n)).unwrap()
}

/// Second pool on the same database file, for tampering with the schema behind a repo's back.
pub async fn side_pool(dir: &TempDir) -> sqlx::SqlitePool {
    let path = dir.path().join("history.db");
    sqlx::SqlitePool::connect(&format!("sqlite:{}", path.display()))
        .await
        .unwrap()
}
