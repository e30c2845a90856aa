use std::net::SocketAddr;

use tracing::{debug, error, info};

use healthcheck_api::config::{CheckConfig, Config};
use healthcheck_api::health::{retain_alive, HealthChecker};
use healthcheck_api::server::Server;
use healthcheck_api::system::{ProcessSource, SystemProcesses};
use healthcheck_api::{logging, VERSION};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    logging::init(&config.logging);

    info!("Starting healthcheck-api {}", VERSION);

    let checks = CheckConfig::load_or_bootstrap(&config.server.config_path)?;
    config.log_summary(&checks);

    let processes = retain_alive(SystemProcesses.snapshot());
    info!("{} processes visible at startup", processes.len());
    for fact in &processes {
        debug!(pid = fact.pid, name = %fact.name, cmdline = %fact.command_line());
    }

    // Probes are I/O bound and the snapshot runs on the blocking pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config, checks))
}

async fn async_main(
    config: Config,
    checks: CheckConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let checker = HealthChecker::new(config.probe.health_config())?;
    let addr = SocketAddr::new(config.server.listen_host, checks.port);
    let server = Server::bind(addr, checks, checker, SystemProcesses)?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutting down...");
            server.trigger_shutdown();
        }
    }

    if server.wait_for_drain(config.server.drain_timeout).await {
        info!("All connections drained");
    }

    Ok(())
}

/// Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
