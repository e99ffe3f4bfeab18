//! Read-only host introspection: system resources and network interfaces.
mod error;
pub use error::AboutError;

mod system;
pub use system::{
    CpuInfo, DiskInfo, MemInfo, SystemInfo, arch, init_uptime, os_info, platform, system_info,
    uptime_seconds,
};

mod network;
pub use network::{InterfaceInfo, NetworkInfo, network_info};
