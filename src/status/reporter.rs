//! Status snapshot assembly.

use std::sync::Arc;

use super::{JudgerVersion, StatusSnapshot};
use crate::system::{CapacityResolver, HostMetrics};

/// Builds [`StatusSnapshot`]s from the capacity resolver and host metrics.
///
/// Holds no state of its own; every snapshot re-queries its providers.
#[derive(Clone)]
pub struct StatusReporter {
    resolver: CapacityResolver,
    metrics: Arc<dyn HostMetrics>,
    version: JudgerVersion,
}

impl StatusReporter {
    pub fn new(
        resolver: CapacityResolver,
        metrics: Arc<dyn HostMetrics>,
        version: JudgerVersion,
    ) -> Self {
        Self {
            resolver,
            metrics,
            version,
        }
    }

    pub fn resolver(&self) -> &CapacityResolver {
        &self.resolver
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            hostname: self.metrics.hostname(),
            cpu_percent: self.metrics.cpu_percent(),
            cpu_core: self.resolver.resolve(),
            memory_percent: self.metrics.memory_percent(),
            judger_version: self.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::CgroupPaths;
    use std::fs;
    use std::num::NonZeroUsize;

    struct FixedMetrics;

    impl HostMetrics for FixedMetrics {
        fn hostname(&self) -> String {
            "judge-test".to_string()
        }

        fn cpu_percent(&self) -> f64 {
            33.0
        }

        fn memory_percent(&self) -> f64 {
            66.0
        }
    }

    #[test]
    fn test_snapshot_uses_providers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cpu.max"), "200000 100000\n").unwrap();

        let resolver = CapacityResolver::new(
            CgroupPaths::new(dir.path()),
            NonZeroUsize::new(16).unwrap(),
        );
        let reporter = StatusReporter::new(
            resolver,
            Arc::new(FixedMetrics),
            JudgerVersion(0x0001_0203),
        );

        let snapshot = reporter.snapshot();
        assert_eq!(snapshot.hostname, "judge-test");
        assert_eq!(snapshot.cpu_percent, 33.0);
        assert_eq!(snapshot.cpu_core.get(), 2);
        assert_eq!(snapshot.memory_percent, 66.0);
        assert_eq!(snapshot.judger_version.to_string(), "1.2.3");
    }

    #[test]
    fn test_snapshot_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CapacityResolver::new(
            CgroupPaths::new(dir.path()),
            NonZeroUsize::new(16).unwrap(),
        );
        let reporter = StatusReporter::new(resolver, Arc::new(FixedMetrics), JudgerVersion(0));

        assert_eq!(reporter.snapshot().cpu_core.get(), 16);
        fs::write(dir.path().join("cpuset.cpus.effective"), "0-2\n").unwrap();
        assert_eq!(reporter.snapshot().cpu_core.get(), 3);
    }
}
