//! Capacity detection and reporting configuration.

use std::path::PathBuf;

use super::parse::{env_opt, env_or, parse_u32};
use super::ConfigError;
use crate::status::JudgerVersion;
use crate::system::{CgroupPaths, DEFAULT_CGROUP_ROOT};

/// Where to look for cgroup limits and what engine version to report.
#[derive(Clone, Debug)]
pub struct SystemConfig {
    /// Root of the cgroup hierarchy (CGROUP_ROOT).
    pub cgroup_root: PathBuf,
    /// Packed judging engine version (JUDGER_VERSION).
    pub judger_version: JudgerVersion,
}

impl SystemConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let judger_version = match env_opt("JUDGER_VERSION") {
            Some(value) => {
                let packed = parse_u32(&value).map_err(|error| ConfigError::Parse {
                    key: "JUDGER_VERSION".into(),
                    value,
                    error,
                })?;
                JudgerVersion(packed)
            }
            None => JudgerVersion::default(),
        };

        Ok(Self {
            cgroup_root: PathBuf::from(env_or("CGROUP_ROOT", DEFAULT_CGROUP_ROOT)),
            judger_version,
        })
    }

    pub fn cgroup_paths(&self) -> CgroupPaths {
        CgroupPaths::new(&self.cgroup_root)
    }
}
