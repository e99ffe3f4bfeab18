use std::{fs, path::Path, sync::OnceLock, time::Instant};

use serde::Serialize;
use sysinfo::{Disks, MINIMUM_CPU_UPDATE_INTERVAL, System};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::trace;

use crate::error::AboutError;

static START: OnceLock<(Instant, OffsetDateTime)> = OnceLock::new();

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub os: String,
    pub os_version: String,
    pub architecture: String,
    pub num_cpu: usize,
    pub cpu_info: Vec<CpuInfo>,
    pub memory: MemInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskInfo>,
    pub start_time: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpuInfo {
    pub name: String,
    pub model: String,
    pub mhz: u64,
    pub usage: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MemInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub usage_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskInfo {
    pub mount_point: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub usage_rate: f64,
}

/// Initialize process start time.
pub fn init_uptime() {
    start();
}

fn start() -> &'static (Instant, OffsetDateTime) {
    START.get_or_init(|| (Instant::now(), OffsetDateTime::now_utc()))
}

/// Get process uptime in seconds.
pub fn uptime_seconds() -> u64 {
    start().0.elapsed().as_secs()
}

/// Get platform (OS family).
#[inline]
pub fn platform() -> &'static str {
    std::env::consts::OS
}

/// Get architecture.
#[inline]
pub fn arch() -> &'static str {
    std::env::consts::ARCH
}

/// Get OS distribution info (Linux only, best effort).
///
/// Returns OS name from `/etc/os-release` or generic platform name.
pub fn os_info() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(content) = fs::read_to_string(Path::new("/etc/os-release")) {
            for line in content.lines() {
                if let Some(name) = line.strip_prefix("PRETTY_NAME=") {
                    return name.trim_matches('"').to_string();
                }
            }
        }
    }

    System::long_os_version().unwrap_or_else(|| platform().to_string())
}

/// Snapshot of host resources. Blocking: reads procfs / sysctl and waits
/// one CPU sampling interval so per-CPU usage is measured, not zero.
pub fn system_info() -> Result<SystemInfo, AboutError> {
    let hostname = hostname::get()?.to_string_lossy().into_owned();
    let mut sys = System::new_all();
    // Usage is a delta between two refreshes.
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_usage();

    let cpu_info: Vec<CpuInfo> = sys
        .cpus()
        .iter()
        .map(|cpu| CpuInfo {
            name: cpu.name().to_string(),
            model: cpu.brand().to_string(),
            mhz: cpu.frequency(),
            usage: cpu.cpu_usage(),
        })
        .collect();

    let memory = MemInfo {
        total: sys.total_memory(),
        used: sys.used_memory(),
        free: sys.free_memory(),
        usage_rate: percent(sys.used_memory(), sys.total_memory()),
    };

    let num_cpu = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(cpu_info.len());
    let start_time = start().1.format(&Rfc3339)?;
    trace!(target: "gremlin.about", cpus = cpu_info.len(), "system snapshot taken");

    Ok(SystemInfo {
        hostname,
        os: platform().to_string(),
        os_version: os_info(),
        architecture: arch().to_string(),
        num_cpu,
        cpu_info,
        memory,
        disk: root_disk(),
        start_time,
        uptime_seconds: uptime_seconds(),
    })
}

fn root_disk() -> Option<DiskInfo> {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .or_else(|| disks.list().first())?;

    let total = disk.total_space();
    let free = disk.available_space();
    let used = total.saturating_sub(free);
    Some(DiskInfo {
        mount_point: disk.mount_point().display().to_string(),
        total,
        used,
        free,
        usage_rate: percent(used, total),
    })
}

#[inline]
fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform() {
        assert!(!platform().is_empty());
        assert!(!arch().is_empty());
    }

    #[test]
    fn percent_handles_empty_total() {
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn snapshot_is_consistent() {
        init_uptime();
        let info = system_info().unwrap();

        assert!(!info.hostname.is_empty());
        assert!(info.num_cpu > 0);
        assert!(info.memory.total >= info.memory.used);
        assert!(info.start_time.contains('T'));

        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("cpu_info").unwrap().is_array());
    }

    #[test]
    fn cpu_usage_reflects_busy_threads() {
        use std::sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        };

        let stop = Arc::new(AtomicBool::new(false));
        let spinners: Vec<_> = (0..4)
            .map(|_| {
                let stop = stop.clone();
                std::thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        std::hint::spin_loop();
                    }
                })
            })
            .collect();

        let info = system_info().unwrap();
        stop.store(true, Ordering::Relaxed);
        for s in spinners {
            s.join().unwrap();
        }

        assert!(!info.cpu_info.is_empty());
        assert!(
            info.cpu_info.iter().any(|c| c.usage > 0.0),
            "every cpu reported zero usage: {:?}",
            info.cpu_info
        );
    }
}
