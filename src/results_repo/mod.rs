// SQLite sample store. One append-only results table, one row per probe
// sample; aggregation is a single grouped range query over it.

pub mod aggregation;

use crate::models::{AggregateRow, BucketWidth, Sample};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

const TIME_INDEX_NAME: &str = "idx_results_created_at";

pub struct ResultsRepo {
    pool: SqlitePool,
    /// Whether the created_at index is kept; also used as the query hint.
    time_index: bool,
}

impl ResultsRepo {
    pub async fn connect(path: &str, max_pool_size: u32, time_index: bool) -> anyhow::Result<Self> {
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
        Ok(Self { pool, time_index })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                ok INTEGER NOT NULL,
                target_addr TEXT NOT NULL,
                network_type TEXT NOT NULL,
                packet_loss REAL NOT NULL,
                latency REAL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        self.ensure_time_index().await?;

        Ok(())
    }

    /// Applies the configured index state. Both directions are no-ops when
    /// already in that state, so init can run on every start.
    async fn ensure_time_index(&self) -> anyhow::Result<()> {
        if self.time_index {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {} ON results(created_at)",
                TIME_INDEX_NAME
            ))
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(&format!("DROP INDEX IF EXISTS {}", TIME_INDEX_NAME))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    #[instrument(skip(self, sample), fields(repo = "results", operation = "insert_sample"))]
    pub async fn insert_sample(&self, sample: &Sample) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO results (created_at, ok, target_addr, network_type, packet_loss, latency)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(sample.created_at)
        .bind(sample.ok)
        .bind(&sample.target_addr)
        .bind(&sample.network_type)
        .bind(sample.packet_loss)
        .bind(sample.latency)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Samples in [start_secs, end_secs] (inclusive both ends), truncated to
    /// `width` buckets measured from the epoch and grouped by
    /// (bucket, network_type). AVG(latency) skips NULL rows; AVG(packet_loss)
    /// counts every row. Buckets with no samples produce no row.
    /// `dimension_filter` restricts the scan to one network type.
    ///
    /// Order: ascending bucket start, then network_type, so dimension order
    /// within a bucket is stable across responses.
    #[instrument(skip(self), fields(repo = "results", operation = "aggregate"))]
    pub async fn aggregate(
        &self,
        start_secs: i64,
        end_secs: i64,
        width: &BucketWidth,
        dimension_filter: Option<&str>,
    ) -> anyhow::Result<Vec<AggregateRow>> {
        let bin_secs = width.as_secs();
        // INDEXED BY is a hint only; the row set is identical without it.
        let source = if self.time_index {
            format!("results INDEXED BY {}", TIME_INDEX_NAME)
        } else {
            "results".to_string()
        };
        let dimension_clause = if dimension_filter.is_some() {
            " AND network_type = $4"
        } else {
            ""
        };
        let sql = format!(
            "SELECT ((created_at / 1000) / $1) * $1 AS bucket_ts,
                    network_type,
                    AVG(latency) AS latency,
                    AVG(packet_loss) AS packet_loss
             FROM {}
             WHERE created_at >= $2 AND created_at <= $3{}
             GROUP BY bucket_ts, network_type
             ORDER BY bucket_ts ASC, network_type ASC",
            source, dimension_clause
        );
        let mut query = sqlx::query(&sql)
            .bind(bin_secs)
            .bind(start_secs * 1000)
            .bind(end_secs * 1000);
        if let Some(network_type) = dimension_filter {
            query = query.bind(network_type);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(AggregateRow {
                created_at: row.try_get("bucket_ts")?,
                network_type: row.try_get("network_type")?,
                latency: row.try_get("latency")?,
                packet_loss: row.try_get("packet_loss")?,
            });
        }
        Ok(out)
    }

    /// Most recent samples, oldest first (insert order).
    pub async fn get_recent_samples(&self, limit: u32) -> anyhow::Result<Vec<Sample>> {
        let rows = sqlx::query(
            "SELECT created_at, ok, target_addr, network_type, packet_loss, latency
             FROM results ORDER BY id DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Sample {
                created_at: row.try_get("created_at")?,
                ok: row.try_get("ok")?,
                target_addr: row.try_get("target_addr")?,
                network_type: row.try_get("network_type")?,
                packet_loss: row.try_get("packet_loss")?,
                latency: row.try_get("latency")?,
            });
        }
        out.reverse();
        Ok(out)
    }
}
