//! System resource detection.
//!
//! Determines how many CPU cores the process may actually use, honouring
//! cgroup limits that plain CPU counts ignore, and samples host
//! utilisation for status reports.
//!
//! # Detection order
//!
//! 1. **cgroup v2** `cpu.max` quota
//! 2. **cgroup v1** `cpu.cfs_quota_us` / `cpu.cfs_period_us`
//! 3. **cpuset**: `cpuset.cpus.effective` (v2), then `cpuset/cpuset.cpus` (v1)
//! 4. OS logical CPU count
//!
//! # Example
//!
//! ```rust,ignore
//! use judge_probe::system::{CapacityResolver, CgroupPaths};
//!
//! let resolver = CapacityResolver::from_host(CgroupPaths::default())?;
//! println!("usable cores: {}", resolver.resolve());
//! ```

mod capacity;
mod cgroup;
mod cpuset;
mod metrics;

pub use capacity::{logical_cpus, Capacity, CapacityError, CapacityResolver};
pub use cgroup::{
    CapacitySource, CgroupPaths, CgroupVersion, CpuQuota, ProbeError, DEFAULT_CGROUP_ROOT,
};
pub use cpuset::parse_cpu_list;
pub use metrics::{memory_percent_from, CpuTimes, HostMetrics, ProcMetrics};
