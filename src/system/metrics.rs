//! Host utilisation metrics (hostname, CPU %, memory %).
//!
//! Reads `/proc/stat` and `/proc/meminfo` on Linux. Unreadable sources are
//! reported as 0% with a warning rather than failing the caller.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

/// Source of live host metrics consumed by the status reporter.
pub trait HostMetrics: Send + Sync {
    /// Network hostname of this machine.
    fn hostname(&self) -> String;

    /// CPU utilisation in percent (0-100) since the previous call.
    fn cpu_percent(&self) -> f64;

    /// Virtual memory utilisation in percent (0-100).
    fn memory_percent(&self) -> f64;
}

/// Aggregate CPU time counters from the first line of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    /// Idle + iowait jiffies
    pub idle: u64,
    /// Sum of user..steal jiffies
    pub total: u64,
}

impl CpuTimes {
    /// Parse the `cpu ` summary line of `/proc/stat`.
    pub fn parse(stat: &str) -> Option<Self> {
        let line = stat.lines().find(|l| l.starts_with("cpu "))?;
        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .map(|v| v.parse().ok())
            .collect::<Option<_>>()?;

        if fields.len() < 4 {
            return None;
        }

        // user nice system idle iowait irq softirq steal (guest is already in user)
        let total = fields.iter().take(8).sum();
        let idle = fields[3] + fields.get(4).copied().unwrap_or(0);

        Some(Self { idle, total })
    }

    /// Busy percentage between an earlier sample and this one.
    pub fn percent_since(&self, earlier: &CpuTimes) -> f64 {
        let total = self.total.saturating_sub(earlier.total);
        if total == 0 {
            return 0.0;
        }
        let idle = self.idle.saturating_sub(earlier.idle).min(total);
        clamp_percent((total - idle) as f64 / total as f64 * 100.0)
    }
}

/// Memory usage percent from `/proc/meminfo` content: `(total - available) / total`.
pub fn memory_percent_from(meminfo: &str) -> Option<f64> {
    let mut total = None;
    let mut available = None;

    for line in meminfo.lines() {
        if line.starts_with("MemTotal:") {
            total = Some(parse_meminfo_kb(line));
        } else if line.starts_with("MemAvailable:") {
            available = Some(parse_meminfo_kb(line));
        }
    }

    let total = total.filter(|t| *t > 0)?;
    let used = total.saturating_sub(available?);
    Some(clamp_percent(used as f64 / total as f64 * 100.0))
}

/// Parse a line like "MemTotal:       16384000 kB" and return the value in KB
fn parse_meminfo_kb(line: &str) -> u64 {
    line.split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// [`HostMetrics`] backed by procfs and the system hostname.
pub struct ProcMetrics {
    proc_root: PathBuf,
    /// Previous `/proc/stat` sample; `None` until the first call.
    last_cpu: Mutex<Option<CpuTimes>>,
}

impl ProcMetrics {
    pub fn new() -> Self {
        Self::with_proc_root("/proc")
    }

    /// Read procfs files below `proc_root` instead of `/proc`.
    pub fn with_proc_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            last_cpu: Mutex::new(None),
        }
    }

    fn read_proc(&self, name: &str) -> Option<String> {
        let path = self.proc_root.join(name);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl Default for ProcMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HostMetrics for ProcMetrics {
    fn hostname(&self) -> String {
        match hostname::get().map(|h| h.into_string()) {
            Ok(Ok(name)) => name,
            Ok(Err(raw)) => raw.to_string_lossy().into_owned(),
            Err(e) => {
                warn!("Failed to resolve hostname: {}", e);
                "unknown".to_string()
            }
        }
    }

    fn cpu_percent(&self) -> f64 {
        let Some(current) = self.read_proc("stat").and_then(|s| CpuTimes::parse(&s)) else {
            return 0.0;
        };

        let mut last = self.last_cpu.lock().unwrap_or_else(|e| e.into_inner());
        // First call measures against boot
        let earlier = last.replace(current).unwrap_or_default();
        current.percent_since(&earlier)
    }

    fn memory_percent(&self) -> f64 {
        self.read_proc("meminfo")
            .and_then(|m| memory_percent_from(&m))
            .unwrap_or(0.0)
    }
}
