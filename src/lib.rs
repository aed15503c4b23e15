//! melodex — multi-source music discovery and aggregation engine.
//!
//! Unifies four upstream catalogs (Spotify, YouTube, Last.fm, Deezer)
//! behind one query surface: genre recommendations and free-text search
//! with caching, per-provider quota budgets, adaptive throttling, and a
//! synthetic fallback so no request ever errors out to the caller.

pub mod aggregator;
pub mod cache;
pub mod deezer;
pub mod errors;
pub mod fallback;
pub mod genres;
pub mod lastfm;
pub mod models;
pub mod providers;
pub mod quota;
pub mod spotify;
pub mod throttle;
pub mod youtube;

pub use aggregator::{AggregatorEngine, EngineConfig, RequestOptions};
pub use models::Track;
pub use providers::{MusicProvider, ProviderId, ProviderManager};
