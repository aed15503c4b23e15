//! Persistence for per-provider quota counters.
//!
//! The counter must survive process restarts or a crash loop would hand
//! the app a fresh daily budget every time it comes back up. The store is
//! a black-box key-value contract; SQLite is the shipped backend and an
//! in-memory map backs the tests.

use crate::errors::QuotaError;
use crate::providers::ProviderId;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;

/// The persisted shape: `{usedToday, resetTimestamp}` per provider, with
/// the reset carried as an RFC 3339 string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaRecord {
    #[serde(rename = "usedToday")]
    pub used_today: u64,
    #[serde(rename = "resetTimestamp")]
    pub reset_at: String,
}

#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn load(&self, provider: ProviderId) -> Result<Option<QuotaRecord>, QuotaError>;
    async fn save(&self, provider: ProviderId, record: &QuotaRecord) -> Result<(), QuotaError>;
}

/// SQLite-backed quota store.
#[derive(Debug, Clone)]
pub struct SqliteQuotaStore {
    pool: Pool<Sqlite>,
}

impl SqliteQuotaStore {
    /// Create the store, ensuring the backing table exists.
    pub async fn new(pool: Pool<Sqlite>) -> Result<Self, QuotaError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS provider_quota (
                provider TEXT PRIMARY KEY,
                used_today INTEGER NOT NULL,
                reset_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl QuotaStore for SqliteQuotaStore {
    async fn load(&self, provider: ProviderId) -> Result<Option<QuotaRecord>, QuotaError> {
        let row: Option<(i64, String)> = sqlx::query_as(
            "SELECT used_today, reset_at FROM provider_quota WHERE provider = ?",
        )
        .bind(provider.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(used, reset_at)| QuotaRecord {
            used_today: used.max(0) as u64,
            reset_at,
        }))
    }

    async fn save(&self, provider: ProviderId, record: &QuotaRecord) -> Result<(), QuotaError> {
        sqlx::query(
            r#"
            INSERT INTO provider_quota (provider, used_today, reset_at)
            VALUES (?, ?, ?)
            ON CONFLICT(provider) DO UPDATE SET
                used_today = excluded.used_today,
                reset_at = excluded.reset_at
            "#,
        )
        .bind(provider.to_string())
        .bind(record.used_today as i64)
        .bind(&record.reset_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// In-memory quota store for tests and for running without a database.
#[derive(Debug, Default)]
pub struct MemoryQuotaStore {
    records: Mutex<HashMap<ProviderId, QuotaRecord>>,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn load(&self, provider: ProviderId) -> Result<Option<QuotaRecord>, QuotaError> {
        Ok(self.records.lock().get(&provider).cloned())
    }

    async fn save(&self, provider: ProviderId, record: &QuotaRecord) -> Result<(), QuotaError> {
        self.records.lock().insert(provider, record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn sqlite_store_round_trips() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteQuotaStore::new(pool).await.unwrap();

        assert!(store.load(ProviderId::Youtube).await.unwrap().is_none());

        let record = QuotaRecord {
            used_today: 300,
            reset_at: "2026-08-07T00:00:00+00:00".to_string(),
        };
        store.save(ProviderId::Youtube, &record).await.unwrap();

        let loaded = store.load(ProviderId::Youtube).await.unwrap().unwrap();
        assert_eq!(loaded.used_today, 300);
        assert_eq!(loaded.reset_at, record.reset_at);
    }

    #[tokio::test]
    async fn sqlite_save_overwrites() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteQuotaStore::new(pool).await.unwrap();

        let first = QuotaRecord {
            used_today: 100,
            reset_at: "2026-08-07T00:00:00+00:00".to_string(),
        };
        let second = QuotaRecord {
            used_today: 200,
            reset_at: "2026-08-08T00:00:00+00:00".to_string(),
        };
        store.save(ProviderId::Youtube, &first).await.unwrap();
        store.save(ProviderId::Youtube, &second).await.unwrap();

        let loaded = store.load(ProviderId::Youtube).await.unwrap().unwrap();
        assert_eq!(loaded.used_today, 200);
    }
}
