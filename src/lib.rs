//! judge_probe - cgroup-aware capacity probe for judge servers.
//!
//! Determines how many CPU cores the current process can really use,
//! honouring cgroup v2/v1 CPU quotas and cpusets that `nproc`-style APIs
//! ignore, and reports it together with live host metrics.
//!
//! # Features
//!
//! - **Capacity detection**: cgroup v2 `cpu.max`, cgroup v1 CFS quota,
//!   cpuset, then the OS logical CPU count
//! - **Status snapshots**: hostname, CPU %, memory %, usable cores, engine version
//! - **Status server**: token-protected `/ping` and `/metrics` endpoints
//! - **Credential bootstrap**: required `TOKEN`, kept only as a SHA-256 digest
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use judge_probe::status::{JudgerVersion, StatusReporter};
//! use judge_probe::system::{CapacityResolver, CgroupPaths, ProcMetrics};
//!
//! let resolver = CapacityResolver::from_host(CgroupPaths::default())?;
//! let reporter = StatusReporter::new(resolver, Arc::new(ProcMetrics::new()), JudgerVersion(0x0002_0100));
//! println!("{}", serde_json::to_string(&reporter.snapshot())?);
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty when built without git
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

pub mod config;
pub mod logging;
pub mod observability;
pub mod server;
pub mod status;
pub mod system;

// Re-exports for convenience
pub use config::Config;
pub use status::{StatusReporter, StatusSnapshot};
pub use system::CapacityResolver;
