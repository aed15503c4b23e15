//! Typed errors for the aggregation engine.
//!
//! Uses `thiserror` for ergonomic error definitions and implements
//! `Serialize` so errors can cross an API boundary cleanly. Provider
//! errors never reach the public operations; they are collapsed to empty
//! result lists at the aggregator boundary and only survive in logs.

use serde::Serialize;
use thiserror::Error;

/// Errors produced by a single provider adapter.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum ProviderError {
    /// HTTP-level failure (connect, status, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream returned a payload we could not interpret
    #[error("Malformed payload: {0}")]
    Parse(String),

    /// Upstream answered but refused the request (auth, 403, invalid key)
    #[error("Rejected by upstream: {0}")]
    Rejected(String),

    /// Call exceeded its per-provider timeout
    #[error("Timed out after {0}ms")]
    Timeout(u64),

    /// The provider's daily quota budget is exhausted
    #[error("Quota exhausted for provider '{0}'")]
    QuotaExhausted(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}

/// Errors from the cache layer. Always treated as a miss by callers.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

/// Errors from the quota persistence store.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Quota store error: {0}")]
    Store(String),
}

impl From<sqlx::Error> for QuotaError {
    fn from(e: sqlx::Error) -> Self {
        QuotaError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for QuotaError {
    fn from(e: serde_json::Error) -> Self {
        QuotaError::Store(e.to_string())
    }
}
