//! Persistent SQLite-backed result cache.
//!
//! Survives process restarts so a cold start right after a provider
//! outage can still serve yesterday's lists through the stale read path.

use crate::cache::CacheStore;
use crate::errors::CacheError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SqliteCache {
    pool: Pool<Sqlite>,
}

impl SqliteCache {
    /// Create the cache, ensuring the backing table exists.
    pub async fn new(pool: Pool<Sqlite>) -> Result<Self, CacheError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS result_cache (
                cache_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                cached_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Remove entries past expiry. Returns the number of evicted rows.
    ///
    /// Housekeeping only; the read paths never delete, so stale entries
    /// stay available for error recovery until this runs.
    pub async fn evict_expired(&self) -> Result<u64, CacheError> {
        let now = Utc::now().timestamp();
        let result = sqlx::query("DELETE FROM result_cache WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        let count = result.rows_affected();
        if count > 0 {
            log::info!("Evicted {} expired cache entries", count);
        }
        Ok(count)
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM result_cache")
            .execute(&self.pool)
            .await?;
        log::info!("Result cache cleared");
        Ok(())
    }
}

#[async_trait]
impl CacheStore for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Utc::now().timestamp();
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT payload FROM result_cache WHERE cache_key = ? AND expires_at > ?",
        )
        .bind(key)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(payload,)| payload))
    }

    async fn get_stale(&self, key: &str) -> Result<Option<String>, CacheError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM result_cache WHERE cache_key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(payload,)| payload))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = Utc::now();
        let expires = now.timestamp() + ttl.as_secs() as i64;

        sqlx::query(
            r#"
            INSERT INTO result_cache (cache_key, payload, cached_at, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                cached_at = excluded.cached_at,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now.timestamp())
        .bind(expires)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn cache() -> SqliteCache {
        // One connection: every pooled connection to :memory: would
        // otherwise get its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteCache::new(pool).await.unwrap()
    }

    #[tokio::test]
    async fn round_trips_within_ttl() {
        let cache = cache().await;
        cache
            .set("search:rock:10:{}", "[1,2,3]", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get("search:rock:10:{}").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[tokio::test]
    async fn expired_entry_only_visible_to_stale_reads() {
        let cache = cache().await;
        // Zero TTL expires immediately at whole-second resolution.
        cache
            .set("k", "v", Duration::from_secs(0))
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.get_stale("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn evict_expired_removes_only_dead_rows() {
        let cache = cache().await;
        cache.set("dead", "x", Duration::from_secs(0)).await.unwrap();
        cache.set("live", "y", Duration::from_secs(600)).await.unwrap();

        let evicted = cache.evict_expired().await.unwrap();
        assert_eq!(evicted, 1);
        assert!(cache.get_stale("dead").await.unwrap().is_none());
        assert!(cache.get("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn overwrite_replaces_payload_and_expiry() {
        let cache = cache().await;
        cache.set("k", "old", Duration::from_secs(0)).await.unwrap();
        cache.set("k", "new", Duration::from_secs(600)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
