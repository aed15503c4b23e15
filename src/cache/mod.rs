//! Result cache contract and key construction.
//!
//! The cache is both a performance layer and a resilience layer: normal
//! reads honor TTL, and a separate stale read path serves expired entries
//! when every live provider has failed. Backends are interchangeable
//! behind [`CacheStore`]; an in-memory map and a SQLite table ship here.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use crate::errors::CacheError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// TTL for free-text search results.
pub const SEARCH_TTL: Duration = Duration::from_secs(15 * 60);
/// TTL for genre recommendation lists.
pub const GENRE_TTL: Duration = Duration::from_secs(60 * 60);

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// TTL-valid read. Expired and missing entries both come back `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Read ignoring expiry. Only the error-recovery path calls this.
    async fn get_stale(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Unconditional overwrite with a caller-chosen TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Deterministic cache key: `<op>:<normalized-input>:<limit>:<options-json>`.
///
/// The serialized option set is part of the key because options like the
/// preferred source or combine mode change the result shape.
pub fn cache_key<T: Serialize>(op: &str, input: &str, limit: usize, options: &T) -> String {
    let options_json = serde_json::to_string(options).unwrap_or_else(|_| "{}".to_string());
    format!("{}:{}:{}:{}", op, input, limit, options_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Default)]
    struct Opts {
        force_fresh: bool,
        combine: bool,
    }

    #[test]
    fn identical_requests_share_a_key() {
        let a = cache_key("search", "daft-punk", 10, &Opts::default());
        let b = cache_key("search", "daft-punk", 10, &Opts::default());
        assert_eq!(a, b);
    }

    #[test]
    fn options_change_the_key() {
        let plain = cache_key("search", "daft-punk", 10, &Opts::default());
        let combined = cache_key(
            "search",
            "daft-punk",
            10,
            &Opts {
                combine: true,
                ..Default::default()
            },
        );
        assert_ne!(plain, combined);
    }

    #[test]
    fn limit_changes_the_key() {
        let ten = cache_key("genre", "rock", 10, &Opts::default());
        let twenty = cache_key("genre", "rock", 20, &Opts::default());
        assert_ne!(ten, twenty);
    }
}
