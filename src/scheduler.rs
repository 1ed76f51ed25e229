// Collection scheduler: two independent cron triggers evaluated in UTC.
//   collect   (default "* * * * *"): sample -> encode -> insert. Failures are logged, tick dropped.
//   retention (default "0 0 * * *"): delete every record older than the retention window.
// Each trigger runs in its own task and finishes its job before waiting for the next fire time.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::history_repo::{CreatedFilter, HistoryRepo, payload};
use crate::sysinfo_repo::{NetworkBaseline, SysinfoRepo};

/// Parses a cron expression. Standard five-field expressions get a leading `0` seconds
/// field; six- and seven-field expressions are passed to `cron` unchanged.
pub fn parse_schedule(expr: &str) -> anyhow::Result<Schedule> {
    let expr = expr.trim();
    let normalized = if expr.split_whitespace().count() == 5 {
        format!("0 {}", expr)
    } else {
        expr.to_string()
    };
    Schedule::from_str(&normalized)
        .map_err(|e| anyhow::anyhow!("invalid cron expression {:?}: {}", expr, e))
}

/// Shared services the triggers run against. The baseline is the same instance the
/// request handlers sample with.
pub struct SchedulerDeps {
    pub sysinfo_repo: Arc<SysinfoRepo>,
    pub baseline: Arc<NetworkBaseline>,
    pub history_repo: Arc<HistoryRepo>,
    pub shutdown_rx: watch::Receiver<bool>,
}

pub struct SchedulerConfig {
    pub collect_schedule: Schedule,
    pub retention_schedule: Schedule,
    pub retention: chrono::Duration,
}

/// Outcome of one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: u64,
    pub failed: u64,
}

/// One collect tick. Returns the new record id, or `None` when the tick was dropped.
#[instrument(skip_all, fields(operation = "collect"))]
pub async fn collect_once(
    sysinfo_repo: &SysinfoRepo,
    baseline: &Arc<NetworkBaseline>,
    history_repo: &HistoryRepo,
) -> Option<i64> {
    let snapshot = match sysinfo_repo.sample(baseline).await {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, operation = "sample", "Failed to get system stats");
            return None;
        }
    };
    let data = match payload::encode(&snapshot) {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, operation = "encode", "Failed to serialize system stats");
            return None;
        }
    };
    match history_repo.insert(&data).await {
        Ok(id) => {
            tracing::debug!(record_id = id, "Snapshot saved");
            Some(id)
        }
        Err(e) => {
            warn!(error = %e, operation = "insert", "Failed to save system stats");
            None
        }
    }
}

/// Deletes every record created strictly before `now - retention`, one by one.
/// A failed delete is logged and skipped; the next sweep picks it up again.
#[instrument(skip(history_repo), fields(operation = "retention_sweep"))]
pub async fn sweep_once(
    history_repo: &HistoryRepo,
    retention: chrono::Duration,
    now: DateTime<Utc>,
) -> SweepReport {
    let cutoff = now - retention;
    let records = match history_repo
        .find_records(CreatedFilter::Before(cutoff), None, None)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, operation = "find_records", "Failed to list expired system stats");
            return SweepReport::default();
        }
    };

    let mut report = SweepReport::default();
    for record in records {
        match history_repo.delete(record.id).await {
            Ok(true) => report.deleted += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, record_id = record.id, "Failed to delete expired system stats");
                report.failed += 1;
            }
        }
    }
    info!(
        deleted = report.deleted,
        failed = report.failed,
        %cutoff,
        "retention sweep complete"
    );
    report
}

/// Spawns both triggers. They stop when `shutdown_rx` changes or its sender is dropped.
pub fn spawn(deps: SchedulerDeps, config: SchedulerConfig) -> tokio::task::JoinHandle<()> {
    let SchedulerDeps {
        sysinfo_repo,
        baseline,
        history_repo,
        shutdown_rx,
    } = deps;
    let SchedulerConfig {
        collect_schedule,
        retention_schedule,
        retention,
    } = config;

    let collect_repo = history_repo.clone();
    let collect = tokio::spawn(run_cron(
        "collect",
        collect_schedule,
        shutdown_rx.clone(),
        move || {
            let sysinfo_repo = sysinfo_repo.clone();
            let baseline = baseline.clone();
            let history_repo = collect_repo.clone();
            async move {
                collect_once(&sysinfo_repo, &baseline, &history_repo).await;
            }
        },
    ));
    let sweep = tokio::spawn(run_cron(
        "retention",
        retention_schedule,
        shutdown_rx,
        move || {
            let history_repo = history_repo.clone();
            async move {
                sweep_once(&history_repo, retention, Utc::now()).await;
            }
        },
    ));

    tokio::spawn(async move {
        let _ = collect.await;
        let _ = sweep.await;
        tracing::debug!("Scheduler shutting down");
    })
}

async fn run_cron<F, Fut>(
    name: &'static str,
    schedule: Schedule,
    mut shutdown_rx: watch::Receiver<bool>,
    mut job: F,
) where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    loop {
        let now = Utc::now();
        let Some(next) = schedule.after(&now).next() else {
            warn!(job = name, "cron schedule has no upcoming fire time; trigger stopped");
            return;
        };
        let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                tracing::debug!(job = name, fire_time = %next, "cron trigger");
                job().await;
            }
            _ = shutdown_rx.changed() => {
                tracing::debug!(job = name, "cron trigger stopped");
                return;
            }
        }
    }
}
