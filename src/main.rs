use std::sync::Arc;

use tracing::{error, info};

use judge_probe::config::Config;
use judge_probe::server::{run_status_server, StatusState};
use judge_probe::status::StatusReporter;
use judge_probe::system::{CapacityResolver, CgroupVersion, ProcMetrics};
use judge_probe::{logging, BUILD_VERSION, PKG_VERSION};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Credential first: nothing runs without TOKEN
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    logging::init(&config.logging)?;

    info!("Starting judge_probe {} ({})", PKG_VERSION, BUILD_VERSION);
    config.log_summary();

    let paths = config.system.cgroup_paths();
    let resolver = CapacityResolver::from_host(paths.clone()).map_err(|e| {
        error!("Cannot determine CPU capacity: {}", e);
        e
    })?;

    let capacity = resolver.detect();
    info!(
        "Usable CPU cores: {} (source: {}, cgroup {})",
        capacity.cores,
        capacity.source,
        CgroupVersion::detect(&paths)
    );

    let reporter = StatusReporter::new(
        resolver,
        Arc::new(ProcMetrics::new()),
        config.system.judger_version,
    );
    let state = Arc::new(
        StatusState::new(reporter, config.token.clone()).map_err(|e| e.to_string())?,
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        tokio::select! {
            result = run_status_server(config.server.listen_addr, state) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                Ok(())
            }
        }
    })
}
