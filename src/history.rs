// Historical query: period keyword -> cutoff -> stored snapshots -> four index-aligned series.

use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use crate::history_repo::payload::{self, PayloadError};
use crate::history_repo::{CreatedFilter, HistoryRepo, SortOrder};
use crate::models::{
    HistoricalCpu, HistoricalDisk, HistoricalMemory, HistoricalRuntime, HistoricalStats,
};

/// Relative lookback windows accepted by the historical endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Hour,
    SixHours,
    Day,
    Week,
    Fortnight,
}

impl Period {
    /// Exact, case-sensitive keyword match. Anything else is `None`.
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "hour" => Some(Period::Hour),
            "sixHrs" => Some(Period::SixHours),
            "day" => Some(Period::Day),
            "week" => Some(Period::Week),
            "fortnight" => Some(Period::Fortnight),
            _ => None,
        }
    }

    pub fn lookback(self) -> Duration {
        match self {
            Period::Hour => Duration::hours(1),
            Period::SixHours => Duration::hours(6),
            Period::Day => Duration::hours(24),
            Period::Week => Duration::days(7),
            Period::Fortnight => Duration::days(14),
        }
    }
}

/// Lower bound for a period keyword. Unknown or empty keywords give the zero time
/// (unix epoch), i.e. no lower bound: the whole retained history is returned.
pub fn cutoff(keyword: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match Period::parse(keyword) {
        Some(period) => now - period.lookback(),
        None => DateTime::UNIX_EPOCH,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    Store(#[from] anyhow::Error),
    #[error("record {id}: {source}")]
    Payload { id: i64, source: PayloadError },
}

/// Builds the series for `keyword` relative to `now`. One undecodable record fails the
/// whole query; partial series would break index alignment.
#[instrument(skip(repo), fields(operation = "query_history"))]
pub async fn query_history(
    repo: &HistoryRepo,
    keyword: &str,
    now: DateTime<Utc>,
) -> Result<HistoricalStats, HistoryError> {
    let cutoff = cutoff(keyword, now);
    let records = repo
        .find_records(CreatedFilter::After(cutoff), Some(SortOrder::Asc), None)
        .await?;

    let mut out = HistoricalStats::with_capacity(records.len());
    for record in records {
        let stats = payload::decode(&record.data).map_err(|source| HistoryError::Payload {
            id: record.id,
            source,
        })?;
        let created = record.created;

        out.cpu.push(HistoricalCpu {
            percent: stats.cpu_percent,
            process_percent: stats.process_cpu_percent,
            created,
        });
        out.memory.push(HistoricalMemory {
            used: stats.memory.used as f64,
            total: stats.memory.total as f64,
            usage: stats.memory.used_percent,
            process_percent: stats.process_memory_percent,
            process_absolute: stats.process_memory_absolute,
            created,
        });
        out.disk.push(HistoricalDisk {
            total: stats.disk.total as f64,
            used: stats.disk.used as f64,
            usage: stats.disk.used_percent,
            created,
        });
        out.runtime.push(HistoricalRuntime {
            alloc: stats.runtime.alloc as f64,
            total_alloc: stats.runtime.total_alloc as f64,
            created,
        });
    }

    tracing::debug!(records = out.len(), %cutoff, "historical query");
    Ok(out)
}
