//! Cgroup CPU limit readers.
//!
//! Each reader inspects one kernel interface and reports a candidate core
//! count, or nothing when the interface is absent or imposes no limit:
//!
//! - cgroup v2 `cpu.max` (`"$MAX $PERIOD"` or `"max $PERIOD"`)
//! - cgroup v1 `cpu.cfs_quota_us` / `cpu.cfs_period_us` (`-1` = unlimited)
//! - `cpuset.cpus.effective` (v2) and `cpuset/cpuset.cpus` (v1)

use std::fmt;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::cpuset::parse_cpu_list;

/// Default mount point of the cgroup hierarchy.
pub const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Cgroup version detected on the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgroupVersion {
    /// cgroup v2 (unified hierarchy)
    V2,
    /// cgroup v1 (legacy hierarchy)
    V1,
    /// No cgroup detected (bare metal or unsupported)
    None,
}

impl CgroupVersion {
    /// Detect the cgroup version mounted under `paths`.
    pub fn detect(paths: &CgroupPaths) -> Self {
        if paths.root().join("cgroup.controllers").exists() {
            return Self::V2;
        }

        if paths.cfs_quota().exists() || paths.cpuset_v1().exists() {
            return Self::V1;
        }

        Self::None
    }
}

impl fmt::Display for CgroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => write!(f, "v2"),
            Self::V1 => write!(f, "v1"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Locations of the CPU limit files below a cgroup root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupPaths {
    root: PathBuf,
}

impl CgroupPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// cgroup v2 quota file.
    pub fn cpu_max(&self) -> PathBuf {
        self.root.join("cpu.max")
    }

    /// cgroup v1 quota file.
    pub fn cfs_quota(&self) -> PathBuf {
        self.root.join("cpu/cpu.cfs_quota_us")
    }

    /// cgroup v1 period file.
    pub fn cfs_period(&self) -> PathBuf {
        self.root.join("cpu/cpu.cfs_period_us")
    }

    /// cgroup v2 effective cpuset.
    pub fn cpuset_effective(&self) -> PathBuf {
        self.root.join("cpuset.cpus.effective")
    }

    /// cgroup v1 cpuset.
    pub fn cpuset_v1(&self) -> PathBuf {
        self.root.join("cpuset/cpuset.cpus")
    }
}

impl Default for CgroupPaths {
    fn default() -> Self {
        Self::new(DEFAULT_CGROUP_ROOT)
    }
}

/// CPU bandwidth limit: `quota` microseconds of CPU time per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuQuota {
    pub quota: i64,
    pub period: i64,
}

impl CpuQuota {
    /// Whole cores granted by this quota, at least 1.
    ///
    /// Returns `None` unless both values are positive.
    pub fn cores(&self) -> Option<NonZeroUsize> {
        if self.quota <= 0 || self.period <= 0 {
            return None;
        }
        let cores = usize::try_from(self.quota / self.period).unwrap_or(usize::MAX);
        NonZeroUsize::new(cores.max(1))
    }

    /// Parse cgroup v2 `cpu.max` content.
    ///
    /// `Ok(None)` means "max" (no limit configured).
    fn parse_cpu_max(content: &str) -> Result<Option<Self>, &'static str> {
        let parts: Vec<&str> = content.split_whitespace().collect();
        match parts.as_slice() {
            ["max"] | ["max", _] => Ok(None),
            [quota, period] => {
                let quota = quota.parse().map_err(|_| "quota is not an integer")?;
                let period = period.parse().map_err(|_| "period is not an integer")?;
                Ok(Some(Self { quota, period }))
            }
            _ => Err("expected \"<quota> <period>\""),
        }
    }
}

/// Failure of a single reader. Never fatal: the resolver logs it and moves on.
#[derive(Debug)]
pub enum ProbeError {
    /// File exists but could not be read.
    Io { path: PathBuf, error: io::Error },
    /// File content does not match the expected format.
    Malformed {
        path: PathBuf,
        content: String,
        reason: &'static str,
    },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Io { path, error } => {
                write!(f, "failed to read '{}': {}", path.display(), error)
            }
            ProbeError::Malformed {
                path,
                content,
                reason,
            } => write!(
                f,
                "malformed '{}' ({}): {:?}",
                path.display(),
                reason,
                content
            ),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Io { error, .. } => Some(error),
            ProbeError::Malformed { .. } => None,
        }
    }
}

/// Which interface produced a core count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacitySource {
    CgroupV2Quota,
    CgroupV1Quota,
    CpusetEffective,
    Cpuset,
    /// OS logical CPU count (no cgroup limit found)
    Os,
}

impl fmt::Display for CapacitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CgroupV2Quota => write!(f, "cgroup v2 cpu.max"),
            Self::CgroupV1Quota => write!(f, "cgroup v1 cfs quota"),
            Self::CpusetEffective => write!(f, "cgroup v2 cpuset.cpus.effective"),
            Self::Cpuset => write!(f, "cgroup v1 cpuset.cpus"),
            Self::Os => write!(f, "os"),
        }
    }
}

/// A reader in the detection chain.
pub struct Probe {
    pub source: CapacitySource,
    pub detect: fn(&CgroupPaths) -> Result<Option<NonZeroUsize>, ProbeError>,
}

/// Readers in priority order. The first one yielding a count wins.
pub const PROBES: [Probe; 4] = [
    Probe {
        source: CapacitySource::CgroupV2Quota,
        detect: read_cpu_max,
    },
    Probe {
        source: CapacitySource::CgroupV1Quota,
        detect: read_cfs_quota,
    },
    Probe {
        source: CapacitySource::CpusetEffective,
        detect: read_cpuset_effective,
    },
    Probe {
        source: CapacitySource::Cpuset,
        detect: read_cpuset_v1,
    },
];

/// Read a small pseudo-file. `Ok(None)` if it does not exist.
fn read_optional(path: &Path) -> Result<Option<String>, ProbeError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            trace!("{} not present", path.display());
            Ok(None)
        }
        Err(error) => Err(ProbeError::Io {
            path: path.to_path_buf(),
            error,
        }),
    }
}

fn read_cpu_max(paths: &CgroupPaths) -> Result<Option<NonZeroUsize>, ProbeError> {
    let path = paths.cpu_max();
    let Some(content) = read_optional(&path)? else {
        return Ok(None);
    };

    let quota = CpuQuota::parse_cpu_max(content.trim()).map_err(|reason| {
        ProbeError::Malformed {
            path: path.clone(),
            content: content.trim().to_string(),
            reason,
        }
    })?;

    match quota {
        Some(q) => {
            trace!("cgroup v2 cpu.max: {}/{}", q.quota, q.period);
            Ok(q.cores())
        }
        None => {
            trace!("cgroup v2 cpu.max: unlimited");
            Ok(None)
        }
    }
}

fn read_cfs_quota(paths: &CgroupPaths) -> Result<Option<NonZeroUsize>, ProbeError> {
    let quota_path = paths.cfs_quota();
    let period_path = paths.cfs_period();

    // Both files must exist for v1 to apply
    let (Some(quota), Some(period)) = (read_optional(&quota_path)?, read_optional(&period_path)?)
    else {
        return Ok(None);
    };

    let quota = CpuQuota {
        quota: parse_integer(&quota_path, &quota)?,
        period: parse_integer(&period_path, &period)?,
    };
    trace!("cgroup v1 cpu quota: {}/{}", quota.quota, quota.period);

    Ok(quota.cores())
}

fn read_cpuset_effective(paths: &CgroupPaths) -> Result<Option<NonZeroUsize>, ProbeError> {
    read_cpuset(&paths.cpuset_effective())
}

fn read_cpuset_v1(paths: &CgroupPaths) -> Result<Option<NonZeroUsize>, ProbeError> {
    read_cpuset(&paths.cpuset_v1())
}

fn read_cpuset(path: &Path) -> Result<Option<NonZeroUsize>, ProbeError> {
    let Some(content) = read_optional(path)? else {
        return Ok(None);
    };

    let content = content.trim();
    if content.is_empty() {
        return Ok(None);
    }

    let cpus = parse_cpu_list(content);
    trace!("{}: {:?}", path.display(), cpus);

    Ok(NonZeroUsize::new(cpus.len()))
}

fn parse_integer(path: &Path, content: &str) -> Result<i64, ProbeError> {
    content
        .trim()
        .parse()
        .map_err(|_| ProbeError::Malformed {
            path: path.to_path_buf(),
            content: content.trim().to_string(),
            reason: "expected a single integer",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cores(n: usize) -> Option<NonZeroUsize> {
        NonZeroUsize::new(n)
    }

    #[test]
    fn test_quota_cores_floor_and_clamp() {
        let q = |quota, period| CpuQuota { quota, period }.cores();
        assert_eq!(q(100_000, 100_000), cores(1));
        assert_eq!(q(400_000, 100_000), cores(4));
        assert_eq!(q(150_000, 100_000), cores(1));
        assert_eq!(q(50_000, 100_000), cores(1));
        assert_eq!(q(-1, 100_000), None);
        assert_eq!(q(100_000, 0), None);
    }

    #[test]
    fn test_parse_cpu_max() {
        assert_eq!(
            CpuQuota::parse_cpu_max("200000 100000"),
            Ok(Some(CpuQuota {
                quota: 200_000,
                period: 100_000
            }))
        );
        assert_eq!(CpuQuota::parse_cpu_max("max"), Ok(None));
        assert_eq!(CpuQuota::parse_cpu_max("max 100000"), Ok(None));
        assert!(CpuQuota::parse_cpu_max("abc 100000").is_err());
        assert!(CpuQuota::parse_cpu_max("100000").is_err());
        assert!(CpuQuota::parse_cpu_max("1 2 3").is_err());
    }

    #[test]
    fn test_cgroup_paths() {
        let paths = CgroupPaths::default();
        assert_eq!(paths.cpu_max(), PathBuf::from("/sys/fs/cgroup/cpu.max"));
        assert_eq!(
            paths.cfs_quota(),
            PathBuf::from("/sys/fs/cgroup/cpu/cpu.cfs_quota_us")
        );
        assert_eq!(
            paths.cfs_period(),
            PathBuf::from("/sys/fs/cgroup/cpu/cpu.cfs_period_us")
        );
        assert_eq!(
            paths.cpuset_effective(),
            PathBuf::from("/sys/fs/cgroup/cpuset.cpus.effective")
        );
        assert_eq!(
            paths.cpuset_v1(),
            PathBuf::from("/sys/fs/cgroup/cpuset/cpuset.cpus")
        );
    }

    #[test]
    fn test_detect_version() {
        let dir = tempfile::tempdir().unwrap();
        let paths = CgroupPaths::new(dir.path());
        assert_eq!(CgroupVersion::detect(&paths), CgroupVersion::None);

        fs::create_dir_all(dir.path().join("cpu")).unwrap();
        fs::write(paths.cfs_quota(), "-1\n").unwrap();
        assert_eq!(CgroupVersion::detect(&paths), CgroupVersion::V1);

        fs::write(dir.path().join("cgroup.controllers"), "cpuset cpu\n").unwrap();
        assert_eq!(CgroupVersion::detect(&paths), CgroupVersion::V2);
        assert_eq!(CgroupVersion::V2.to_string(), "v2");
    }

    #[test]
    fn test_malformed_v1_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let paths = CgroupPaths::new(dir.path());
        fs::create_dir_all(dir.path().join("cpu")).unwrap();
        fs::write(paths.cfs_quota(), "lots\n").unwrap();
        fs::write(paths.cfs_period(), "100000\n").unwrap();

        let err = read_cfs_quota(&paths).unwrap_err();
        assert!(matches!(err, ProbeError::Malformed { .. }));
        assert!(err.to_string().contains("cpu.cfs_quota_us"));
    }

    #[test]
    fn test_v1_requires_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = CgroupPaths::new(dir.path());
        fs::create_dir_all(dir.path().join("cpu")).unwrap();
        fs::write(paths.cfs_quota(), "200000\n").unwrap();

        assert_eq!(read_cfs_quota(&paths).unwrap(), None);
    }
}
