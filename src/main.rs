use anyhow::Result;
use hoststats::runtime_stats::TotalAlloc;
use hoststats::*;
use std::sync::Arc;
use tikv_jemallocator::Jemalloc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[global_allocator]
static GLOBAL: TotalAlloc<Jemalloc> = TotalAlloc::new(Jemalloc);

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

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let sysinfo_repo = Arc::new(sysinfo_repo::SysinfoRepo::new()?);
    let baseline = Arc::new(sysinfo_repo::NetworkBaseline::new());
    let history_repo = Arc::new(
        history_repo::HistoryRepo::connect(
            &app_config.database.path,
            app_config.database.max_pool_size,
        )
        .await?,
    );
    history_repo.init().await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let scheduler_handle = scheduler::spawn(
        scheduler::SchedulerDeps {
            sysinfo_repo: sysinfo_repo.clone(),
            baseline: baseline.clone(),
            history_repo: history_repo.clone(),
            shutdown_rx,
        },
        scheduler::SchedulerConfig {
            collect_schedule: scheduler::parse_schedule(&app_config.schedule.collect)?,
            retention_schedule: scheduler::parse_schedule(&app_config.schedule.retention)?,
            retention: app_config.retention(),
        },
    );
    tracing::info!(
        collect = %app_config.schedule.collect,
        retention = %app_config.schedule.retention,
        retention_days = app_config.database.retention_days,
        "scheduler started"
    );

    let app = routes::app(sysinfo_repo, baseline, history_repo);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(true);
    let _ = scheduler_handle.await;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
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
