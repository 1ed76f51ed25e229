// SQLite snapshot store. One row per collect tick: store-assigned id and creation time
// (unix ms, UTC) plus the snapshot payload as opaque JSON text.
//
// Creation time is assigned here, never by the sampler, and never goes backwards:
// an insert takes max(now, newest created) so insertion order and time order agree.

pub mod payload;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

/// One persisted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: i64,
    pub created: DateTime<Utc>,
    /// Serialized snapshot; see [`payload`].
    pub data: String,
}

/// Creation-time filter for [`HistoryRepo::find_records`]. Both bounds are strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedFilter {
    Before(DateTime<Utc>),
    After(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

pub struct HistoryRepo {
    pool: SqlitePool,
}

impl HistoryRepo {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS system_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created INTEGER NOT NULL,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_system_stats_created ON system_stats(created)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Stores a payload with a store-assigned creation time. Returns the new record id.
    #[instrument(skip(self, data), fields(repo = "history", operation = "insert"))]
    pub async fn insert(&self, data: &str) -> anyhow::Result<i64> {
        let now_ms = Utc::now().timestamp_millis();
        let r = sqlx::query(
            "INSERT INTO system_stats (created, data)
             VALUES (MAX($1, COALESCE((SELECT MAX(created) FROM system_stats), 0)), $2)",
        )
        .bind(now_ms)
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(r.last_insert_rowid())
    }

    /// Stores a payload with an explicit creation time (seeding and imports).
    #[instrument(skip(self, data), fields(repo = "history", operation = "insert_at"))]
    pub async fn insert_at(&self, created: DateTime<Utc>, data: &str) -> anyhow::Result<i64> {
        let r = sqlx::query("INSERT INTO system_stats (created, data) VALUES ($1, $2)")
            .bind(created.timestamp_millis())
            .bind(data)
            .execute(&self.pool)
            .await?;
        Ok(r.last_insert_rowid())
    }

    /// Records matching `filter`. `order = None` leaves row order unspecified;
    /// `limit = None` is unbounded. Ties on `created` are ordered by id.
    #[instrument(skip(self), fields(repo = "history", operation = "find_records"))]
    pub async fn find_records(
        &self,
        filter: CreatedFilter,
        order: Option<SortOrder>,
        limit: Option<u32>,
    ) -> anyhow::Result<Vec<StoredRecord>> {
        let (cmp, ts) = match filter {
            CreatedFilter::Before(ts) => ("<", ts),
            CreatedFilter::After(ts) => (">", ts),
        };
        let order_sql = match order {
            Some(SortOrder::Asc) => " ORDER BY created ASC, id ASC",
            Some(SortOrder::Desc) => " ORDER BY created DESC, id DESC",
            None => "",
        };
        let limit_sql = if limit.is_some() { " LIMIT $2" } else { "" };
        let sql = format!(
            "SELECT id, created, data FROM system_stats WHERE created {cmp} $1{order_sql}{limit_sql}"
        );

        let mut query = sqlx::query(&sql).bind(ts.timestamp_millis());
        if let Some(limit) = limit {
            query = query.bind(limit as i64);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Self::parse_record_row(&row)?);
        }
        Ok(out)
    }

    /// Deletes one record. Returns false when no such id existed.
    #[instrument(skip(self), fields(repo = "history", operation = "delete"))]
    pub async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let r = sqlx::query("DELETE FROM system_stats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }

    pub async fn count(&self) -> anyhow::Result<u64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM system_stats")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    /// Most recently created record, if any.
    pub async fn latest(&self) -> anyhow::Result<Option<StoredRecord>> {
        let row = sqlx::query(
            "SELECT id, created, data FROM system_stats ORDER BY created DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::parse_record_row).transpose()
    }

    fn parse_record_row(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<StoredRecord> {
        let id: i64 = row.try_get("id")?;
        let created_ms: i64 = row.try_get("created")?;
        let data: String = row.try_get("data")?;
        let created = DateTime::from_timestamp_millis(created_ms)
            .ok_or_else(|| anyhow::anyhow!("record {}: created {} out of range", id, created_ms))?;
        Ok(StoredRecord { id, created, data })
    }
}
