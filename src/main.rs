use anyhow::Result;
use netmonitor::collector::devices::DeviceCollector;
use netmonitor::collector::reachability::ReachabilityCollector;
use netmonitor::collector::traffic::TrafficCollector;
use netmonitor::discovery::SystemDiscovery;
use netmonitor::discovery::sweep::PingSweep;
use netmonitor::probe::SystemProber;
use netmonitor::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let store = Arc::new(store::Store::new());
    let (live_tx, _) =
        broadcast::channel::<models::LiveData>(app_config.publishing.broadcast_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ws_connections = Arc::new(AtomicUsize::new(0));

    let collectors_cfg = &app_config.collectors;
    let probe_cfg = &app_config.probe;
    let discovery_cfg = &app_config.discovery;

    let traffic = TrafficCollector::new(store.clone(), Arc::new(sysinfo_repo::SysinfoRepo::new()));

    let prober = Arc::new(SystemProber::new(
        Duration::from_millis(probe_cfg.icmp_timeout_ms),
        Duration::from_millis(probe_cfg.tcp_timeout_ms),
    ));
    let reachability = ReachabilityCollector::new(store.clone(), prober, probe_cfg).await;

    let sweeper = discovery_cfg
        .sweep_enabled
        .then(|| Arc::new(PingSweep::new(Duration::from_millis(discovery_cfg.sweep_timeout_ms))));
    let devices = DeviceCollector::new(
        store.clone(),
        Arc::new(SystemDiscovery::new(discovery_cfg.neighbor_source)),
        sweeper,
    );

    let handles = vec![
        collector::spawn(
            traffic,
            collectors_cfg.traffic_interval_ms,
            shutdown_rx.clone(),
        ),
        collector::spawn(
            devices,
            collectors_cfg.discovery_interval_ms,
            shutdown_rx.clone(),
        ),
        collector::spawn(
            reachability,
            collectors_cfg.ping_interval_ms,
            shutdown_rx.clone(),
        ),
        worker::spawn(
            worker::WorkerDeps {
                store: store.clone(),
                tx: live_tx.clone(),
                ws_connections: ws_connections.clone(),
                shutdown_rx,
            },
            worker::WorkerConfig {
                live_interval_ms: app_config.publishing.live_interval_ms,
                stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
            },
        ),
    ];

    let app = routes::app(store, live_tx, ws_connections);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Network monitor listening on http://{}", addr);
    tracing::info!("API: http://{}/api/", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            // Collectors stop between ticks; an in-flight probe runs to its timeout.
            let _ = shutdown_tx.send(true);
            for handle in handles {
                let _ = handle.await;
            }
        }
    }

    Ok(())
}
