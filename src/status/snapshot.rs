//! Status snapshot types.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Serialize, Serializer};

/// Judging engine version packed as `0x00MMmmpp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JudgerVersion(pub u32);

impl JudgerVersion {
    pub fn major(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn minor(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn patch(&self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for JudgerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

impl Serialize for JudgerVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Point-in-time host status, built fresh for every report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub hostname: String,
    /// CPU utilisation, 0-100
    #[serde(rename = "cpu")]
    pub cpu_percent: f64,
    /// Usable cores after cgroup limits
    pub cpu_core: NonZeroUsize,
    /// Memory utilisation, 0-100
    #[serde(rename = "memory")]
    pub memory_percent: f64,
    pub judger_version: JudgerVersion,
}
