//! Prometheus exposition of host status.

use prometheus::{Encoder, Gauge, IntGauge, Opts, Registry, TextEncoder};

use crate::status::StatusSnapshot;

/// Gauges mirroring the fields of a [`StatusSnapshot`].
pub struct StatusMetrics {
    registry: Registry,

    /// Usable CPU cores after cgroup limits
    pub cpu_cores: IntGauge,

    /// Host CPU utilisation percent
    pub cpu_usage_percent: Gauge,

    /// Host memory utilisation percent
    pub memory_usage_percent: Gauge,
}

impl StatusMetrics {
    /// Create a registry with all status gauges.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cpu_cores = IntGauge::with_opts(Opts::new(
            "judge_probe_cpu_cores",
            "Usable CPU cores after cgroup limits",
        ))?;
        let cpu_usage_percent = Gauge::with_opts(Opts::new(
            "judge_probe_cpu_usage_percent",
            "Host CPU utilisation percent",
        ))?;
        let memory_usage_percent = Gauge::with_opts(Opts::new(
            "judge_probe_memory_usage_percent",
            "Host memory utilisation percent",
        ))?;

        registry.register(Box::new(cpu_cores.clone()))?;
        registry.register(Box::new(cpu_usage_percent.clone()))?;
        registry.register(Box::new(memory_usage_percent.clone()))?;

        Ok(Self {
            registry,
            cpu_cores,
            cpu_usage_percent,
            memory_usage_percent,
        })
    }

    /// Set all gauges from a snapshot.
    pub fn observe(&self, snapshot: &StatusSnapshot) {
        self.cpu_cores
            .set(i64::try_from(snapshot.cpu_core.get()).unwrap_or(i64::MAX));
        self.cpu_usage_percent.set(snapshot.cpu_percent);
        self.memory_usage_percent.set(snapshot.memory_percent);
    }

    /// Encode all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::JudgerVersion;
    use std::num::NonZeroUsize;

    #[test]
    fn test_encode_snapshot() {
        let metrics = StatusMetrics::new().unwrap();
        metrics.observe(&StatusSnapshot {
            hostname: "judge-1".to_string(),
            cpu_percent: 12.5,
            cpu_core: NonZeroUsize::new(4).unwrap(),
            memory_percent: 40.0,
            judger_version: JudgerVersion(0),
        });

        let text = metrics.encode().unwrap();
        assert!(text.contains("# TYPE judge_probe_cpu_cores gauge"));
        assert!(text.contains("judge_probe_cpu_cores 4"));
        assert!(text.contains("judge_probe_cpu_usage_percent 12.5"));
        assert!(text.contains("judge_probe_memory_usage_percent 40"));
    }
}
