// Sampler: point-in-time host, process and network metrics via sysinfo.
// Network counters are turned into deltas against a NetworkBaseline the caller owns.

mod baseline;
mod linux;

pub use baseline::{NetCounters, NetworkBaseline};

use crate::models::*;
use crate::runtime_stats;
use std::path::Path;
use std::sync::{Arc, Mutex};
use sysinfo::{Disk, Disks, Networks, Pid, ProcessesToUpdate, System};
use tracing::instrument;

pub struct SysinfoRepo {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
    pid: Pid,
}

impl SysinfoRepo {
    pub fn new() -> anyhow::Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| anyhow::anyhow!("resolve current pid: {}", e))?;
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        Ok(Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
            networks: Arc::new(Mutex::new(networks)),
            pid,
        })
    }

    /// Takes one snapshot. Any failed query aborts the whole sample; there is no partial result.
    /// CPU percentages are relative to the previous call (the first call after startup may read 0).
    #[instrument(skip(self, baseline), fields(repo = "sysinfo", operation = "sample"))]
    pub async fn sample(&self, baseline: &Arc<NetworkBaseline>) -> anyhow::Result<Snapshot> {
        let sys = self.sys.clone();
        let disks = self.disks.clone();
        let networks = self.networks.clone();
        let baseline = baseline.clone();
        let pid = self.pid;
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;

            sys.refresh_cpu_all();
            let cpu = cpu_info(&sys);
            anyhow::ensure!(!cpu.is_empty(), "cpu query returned no cores");
            let cpu_percent = f64::from(sys.global_cpu_usage()).clamp(0.0, 100.0);

            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);
            let process = sys
                .process(pid)
                .ok_or_else(|| anyhow::anyhow!("process {} not found", pid))?;
            let process_cpu_percent = f64::from(process.cpu_usage());
            let rss = process.memory();
            let total_memory = sys.total_memory();
            let process_memory_percent = percent(rss, total_memory) as f32;

            let memory = memory_stats(&sys);
            let swap = swap_stats(&sys);
            let host = host_info(&sys);
            drop(sys);

            let disk = {
                let mut disks = disks
                    .lock()
                    .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
                disks.refresh(true);
                root_disk_usage(disks.list())
                    .ok_or_else(|| anyhow::anyhow!("disk query returned no filesystems"))?
            };

            let runtime = runtime_stats::read()?;

            let counters = {
                let mut networks = networks
                    .lock()
                    .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
                networks.refresh(true);
                networks
                    .list()
                    .values()
                    .fold(NetCounters::default(), |acc, data| NetCounters {
                        bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                        bytes_recv: acc.bytes_recv.saturating_add(data.total_received()),
                        packets_sent: acc
                            .packets_sent
                            .saturating_add(data.total_packets_transmitted()),
                        packets_recv: acc
                            .packets_recv
                            .saturating_add(data.total_packets_received()),
                    })
            };
            let network_stats = baseline.advance(counters);

            Ok(Snapshot {
                schema_version: SNAPSHOT_SCHEMA_VERSION,
                cpu,
                cpu_percent,
                process_cpu_percent,
                process_memory_percent,
                process_memory_absolute: rss as f64,
                memory,
                swap,
                disk,
                host,
                runtime,
                network_stats,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}

fn percent(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

fn cpu_info(sys: &System) -> Vec<CpuInfo> {
    let proc_model = linux::read_cpu_model_linux();
    sys.cpus()
        .iter()
        .enumerate()
        .map(|(i, c)| CpuInfo {
            cpu: i as u32,
            vendor_id: c.vendor_id().to_string(),
            model_name: Some(c.brand().trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| proc_model.clone())
                .unwrap_or_else(|| "Unknown".into()),
            mhz: c.frequency(),
        })
        .collect()
}

fn memory_stats(sys: &System) -> MemoryStats {
    let total = sys.total_memory();
    let available = sys.available_memory();
    let used = total.saturating_sub(available);
    MemoryStats {
        total,
        available,
        used,
        used_percent: percent(used, total),
    }
}

fn swap_stats(sys: &System) -> SwapStats {
    let total = sys.total_swap();
    let used = sys.used_swap();
    SwapStats {
        total,
        used,
        free: total.saturating_sub(used),
        used_percent: percent(used, total),
    }
}

fn host_info(sys: &System) -> HostInfo {
    HostInfo {
        hostname: System::host_name().unwrap_or_default(),
        uptime: System::uptime(),
        boot_time: System::boot_time(),
        procs: sys.processes().len() as u64,
        os: std::env::consts::OS.into(),
        platform: linux::read_platform_linux()
            .or_else(System::name)
            .unwrap_or_default(),
        platform_version: System::os_version().unwrap_or_default(),
        kernel_version: System::kernel_version().unwrap_or_default(),
        kernel_arch: std::env::consts::ARCH.into(),
        host_id: linux::read_machine_id_linux().unwrap_or_default(),
    }
}

/// Usage of the filesystem mounted at "/". Falls back to the largest filesystem when
/// "/" is not listed (e.g. overlay roots filtered out in containers).
fn root_disk_usage(disks: &[Disk]) -> Option<DiskUsage> {
    let root = Path::new("/");
    let disk = disks
        .iter()
        .find(|d| d.mount_point() == root)
        .or_else(|| {
            let largest = disks.iter().max_by_key(|d| d.total_space());
            if let Some(d) = largest {
                tracing::debug!(
                    mount = %d.mount_point().display(),
                    "root filesystem not listed, using largest disk"
                );
            }
            largest
        })?;
    let total = disk.total_space();
    let free = disk.available_space();
    let used = total.saturating_sub(free);
    Some(DiskUsage {
        path: disk.mount_point().to_string_lossy().into_owned(),
        fstype: disk.file_system().to_string_lossy().into_owned(),
        total,
        free,
        used,
        used_percent: percent(used, total),
    })
}

#[cfg(test)]
mod tests {
    use super::percent;

    #[test]
    fn percent_of_zero_total_is_zero() {
        assert_eq!(percent(10, 0), 0.0);
    }

    #[test]
    fn percent_is_scaled_to_hundred() {
        assert_eq!(percent(1, 4), 25.0);
    }
}
