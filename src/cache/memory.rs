use crate::cache::CacheStore;
use crate::errors::CacheError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Maximum number of entries before the oldest is evicted.
const MAX_ENTRIES: usize = 256;

struct Entry {
    payload: String,
    cached_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// In-memory cache. Expired entries are kept around until capacity
/// pressure evicts them, so the stale read path still has something to
/// serve after a total provider outage.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries,
        }
    }

    fn evict_oldest(entries: &mut HashMap<String, Entry>) {
        if let Some(oldest_key) = entries
            .iter()
            .min_by_key(|(_, e)| e.cached_at)
            .map(|(k, _)| k.clone())
        {
            entries.remove(&oldest_key);
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.lock();
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.payload.clone()))
    }

    async fn get_stale(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.lock();
        Ok(entries.get(key).map(|e| e.payload.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock();
        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            Self::evict_oldest(&mut entries);
        }
        entries.insert(
            key.to_string(),
            Entry {
                payload: value.to_string(),
                cached_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }
}
