use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use super::{Store, StoreError, StoreResult};
use crate::models::PasteRecord;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS paste (
    id TEXT PRIMARY KEY NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    expires_at INTEGER,
    max_views INTEGER,
    views INTEGER NOT NULL DEFAULT 0
)";

#[derive(FromRow)]
struct PasteRow {
    content: String,
    created_at: i64,
    expires_at: Option<i64>,
    max_views: Option<i64>,
    views: i64,
}

impl PasteRow {
    fn into_record(self, id: &str) -> StoreResult<PasteRecord> {
        let count = |value: i64, column: &str| {
            u64::try_from(value).map_err(|_| StoreError::InvalidRecord {
                id: id.to_owned(),
                reason: format!("negative {column}"),
            })
        };
        Ok(PasteRecord {
            content: self.content,
            created_at: self.created_at,
            expires_at: self.expires_at,
            max_views: self.max_views.map(|v| count(v, "max_views")).transpose()?,
            views: count(self.views, "views")?,
        })
    }
}

/// Store backed by a SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to a database by URL, creating the file and table if needed.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new();
        if url.contains(":memory:") {
            // every connection to an in-memory database gets its own copy
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!("connected to sqlite database: {url}");

        Ok(Self { pool })
    }
}

fn to_sql_count(id: &str, value: u64) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::InvalidRecord {
        id: id.to_owned(),
        reason: format!("count {value} out of range"),
    })
}

impl Store for SqliteStore {
    async fn get(&self, id: &str) -> StoreResult<Option<PasteRecord>> {
        let row = sqlx::query_as::<_, PasteRow>(
            "SELECT content, created_at, expires_at, max_views, views FROM paste WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| row.into_record(id)).transpose()
    }

    async fn set(&self, id: &str, record: PasteRecord) -> StoreResult<()> {
        let max_views = record
            .max_views
            .map(|v| to_sql_count(id, v))
            .transpose()?;
        let views = to_sql_count(id, record.views)?;

        sqlx::query(
            "INSERT INTO paste (id, content, created_at, expires_at, max_views, views) VALUES \
             (?, ?, ?, ?, ?, ?) ON CONFLICT (id) DO UPDATE SET content = excluded.content, \
             created_at = excluded.created_at, expires_at = excluded.expires_at, max_views = \
             excluded.max_views, views = excluded.views",
        )
        .bind(id)
        .bind(record.content)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(max_views)
        .bind(views)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn has(&self, id: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM paste WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn record_view(&self, id: &str, now: i64) -> StoreResult<Option<PasteRecord>> {
        // must mirror PasteRecord::is_visible
        let row = sqlx::query_as::<_, PasteRow>(
            "UPDATE paste SET views = views + 1 WHERE id = ? AND (expires_at IS NULL OR ? < \
             expires_at) AND (max_views IS NULL OR views < max_views) RETURNING content, \
             created_at, expires_at, max_views, views",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| row.into_record(id)).transpose()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
