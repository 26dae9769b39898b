//! Usable CPU core detection.
//!
//! Runs the cgroup readers in priority order and falls back to the OS
//! logical CPU count when none of them reports a limit.

use std::fmt;
use std::num::NonZeroUsize;

use tracing::{debug, warn};

use super::cgroup::{CapacitySource, CgroupPaths, PROBES};

/// Core count resolved at startup cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    /// The OS reported zero (or unknown) logical CPUs.
    NoLogicalCpus,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityError::NoLogicalCpus => {
                write!(f, "operating system reported no usable logical CPUs")
            }
        }
    }
}

impl std::error::Error for CapacityError {}

/// Query the OS for the logical CPU count.
pub fn logical_cpus() -> Result<NonZeroUsize, CapacityError> {
    NonZeroUsize::new(num_cpus::get()).ok_or(CapacityError::NoLogicalCpus)
}

/// Resolved core count together with the interface it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub cores: NonZeroUsize,
    pub source: CapacitySource,
}

/// Determines how many CPU cores this process may actually use.
///
/// Nothing is cached: every call re-reads the cgroup files.
#[derive(Debug, Clone)]
pub struct CapacityResolver {
    paths: CgroupPaths,
    fallback: NonZeroUsize,
}

impl CapacityResolver {
    /// Create a resolver reading `paths`, answering `fallback` when no
    /// cgroup limit applies.
    pub fn new(paths: CgroupPaths, fallback: NonZeroUsize) -> Self {
        Self { paths, fallback }
    }

    /// Create a resolver for the running host.
    ///
    /// Fails only if the OS cannot report a logical CPU count, since there
    /// is nothing left to fall back to.
    pub fn from_host(paths: CgroupPaths) -> Result<Self, CapacityError> {
        Ok(Self::new(paths, logical_cpus()?))
    }

    pub fn paths(&self) -> &CgroupPaths {
        &self.paths
    }

    /// Usable core count, always at least 1.
    pub fn resolve(&self) -> NonZeroUsize {
        self.detect().cores
    }

    /// Like [`resolve`](Self::resolve), also reporting which source won.
    pub fn detect(&self) -> Capacity {
        for probe in &PROBES {
            match (probe.detect)(&self.paths) {
                Ok(Some(cores)) => {
                    debug!("Using {} CPU count: {}", probe.source, cores);
                    return Capacity {
                        cores,
                        source: probe.source,
                    };
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(source = %probe.source, "Failed to read cgroup CPU info: {}", e);
                }
            }
        }

        debug!("Using OS CPU count (fallback): {}", self.fallback);
        Capacity {
            cores: self.fallback,
            source: CapacitySource::Os,
        }
    }
}
