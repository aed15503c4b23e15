//! The aggregation engine.
//!
//! Sits between the API-route layer and the upstream catalogs: checks the
//! cache, asks the quota manager which providers may run, fans out behind
//! per-provider timeouts, merges and filters what comes back, and falls
//! back to stale cache or synthetic tracks so the caller always gets a
//! well-formed list. Nothing above this module ever sees an error for a
//! recommendation or search request.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::aggregator::merge::{dedup_tracks, filter_invalid, shuffle_tracks};
use crate::aggregator::types::RequestOptions;
use crate::cache::{cache_key, CacheStore, GENRE_TTL, SEARCH_TTL};
use crate::fallback::FallbackGenerator;
use crate::genres::{normalize_genre, normalize_query};
use crate::models::Track;
use crate::providers::{MusicProvider, ProviderId, ProviderManager};
use crate::quota::QuotaManager;
use crate::throttle::ThrottleController;

/// Below this many surviving tracks a broadened secondary pass runs.
const MIN_RESULTS_BEFORE_BROADEN: usize = 5;
/// Generic qualifier appended for the broadened pass.
const BROADEN_QUALIFIER: &str = "music";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Provider priority order for the fan-out
    pub priority: Vec<ProviderId>,
    /// Fixed shuffle seed; `None` draws from the thread RNG
    pub shuffle_seed: Option<u64>,
    /// Skip the presentation shuffle entirely (deterministic tests)
    pub preserve_order: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            priority: ProviderId::upstream().to_vec(),
            shuffle_seed: None,
            preserve_order: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Genre,
    Search,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Genre => "genre",
            Operation::Search => "search",
        }
    }

    fn ttl(&self) -> Duration {
        match self {
            Operation::Genre => GENRE_TTL,
            Operation::Search => SEARCH_TTL,
        }
    }
}

/// One engine per process, constructed at startup and shared by `Arc`.
pub struct AggregatorEngine {
    providers: Arc<ProviderManager>,
    quota: Arc<QuotaManager>,
    throttle: Arc<ThrottleController>,
    cache: Arc<dyn CacheStore>,
    fallback: FallbackGenerator,
    config: EngineConfig,
}

impl AggregatorEngine {
    pub fn new(
        providers: Arc<ProviderManager>,
        quota: Arc<QuotaManager>,
        throttle: Arc<ThrottleController>,
        cache: Arc<dyn CacheStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            providers,
            quota,
            throttle,
            cache,
            fallback: FallbackGenerator::new(),
            config,
        }
    }

    /// Genre browse. `genre` may be anything a user typed; it is resolved
    /// against the canonical vocabulary before any provider sees it.
    pub async fn get_recommendations_by_genre(
        &self,
        genre: &str,
        limit: usize,
        options: &RequestOptions,
    ) -> Vec<Track> {
        let canonical = normalize_genre(genre);
        self.aggregate(Operation::Genre, canonical, canonical, limit, options)
            .await
    }

    /// Free-text search across every admissible provider.
    pub async fn search_multi_source(
        &self,
        query: &str,
        limit: usize,
        options: &RequestOptions,
    ) -> Vec<Track> {
        let normalized = normalize_query(query);
        self.aggregate(Operation::Search, &normalized, query, limit, options)
            .await
    }

    /// Shared core. `key_input` is the normalized form used for cache
    /// keys and fallback context; `wire_input` is what providers receive.
    async fn aggregate(
        &self,
        op: Operation,
        key_input: &str,
        wire_input: &str,
        limit: usize,
        options: &RequestOptions,
    ) -> Vec<Track> {
        if limit == 0 {
            return Vec::new();
        }

        let key = cache_key(op.as_str(), key_input, limit, &options.cache_facet());

        if !options.force_fresh {
            if let Some(cached) = self.cache_read(&key).await {
                return cached;
            }
        }

        let mut tracks = self.fan_out(op, wire_input, limit, options).await;
        tracks = dedup_tracks(tracks);
        tracks = filter_invalid(tracks, options.exclude_artist.as_deref());

        if tracks.len() < limit.min(MIN_RESULTS_BEFORE_BROADEN) {
            let broadened = format!("{} {}", wire_input, BROADEN_QUALIFIER);
            log::info!(
                "Thin result set ({} tracks) for '{}', broadening to '{}'",
                tracks.len(),
                wire_input,
                broadened
            );
            let extra = self
                .fan_out(Operation::Search, &broadened, limit, options)
                .await;
            tracks.extend(extra);
            tracks = dedup_tracks(tracks);
            tracks = filter_invalid(tracks, options.exclude_artist.as_deref());
        }

        if tracks.is_empty() {
            // Stale-while-error: an expired entry beats synthetic data.
            if let Some(stale) = self.cache_read_stale(&key).await {
                log::warn!(
                    "All providers failed for '{}', serving stale cache",
                    key_input
                );
                return stale;
            }
            return self.fallback.generate(key_input, limit);
        }

        if !self.config.preserve_order {
            shuffle_tracks(&mut tracks, self.config.shuffle_seed);
        }
        tracks.truncate(limit);

        if !options.force_fresh {
            self.cache_write(&key, &tracks, op.ttl()).await;
        }

        tracks
    }

    /// Resolve the candidate list and run the concurrent fan-out.
    async fn fan_out(
        &self,
        op: Operation,
        input: &str,
        limit: usize,
        options: &RequestOptions,
    ) -> Vec<Track> {
        let mut order = self.config.priority.clone();
        if let Some(preferred) = options.preferred_source {
            order.retain(|id| *id != preferred);
            order.insert(0, preferred);
        }

        let mut candidates = self.providers.enabled_in_order(&order).await;
        if candidates.is_empty() {
            log::warn!("No enabled providers for {} request", op.as_str());
            return Vec::new();
        }

        // A preferred source without combine gets first refusal: if it
        // satisfies the limit alone, nobody else is called (or charged).
        if let Some(preferred) = options.preferred_source {
            if !options.combine_results {
                if let Some(pos) = candidates.iter().position(|(p, _)| p.id() == preferred) {
                    let (provider, timeout) = candidates.remove(pos);
                    if self.admit(preferred).await {
                        let tracks = self
                            .call_provider(op, provider, input, limit, self.effective_timeout(timeout, options))
                            .await;
                        if tracks.len() >= limit {
                            return tracks;
                        }
                        log::debug!(
                            "Preferred source {} returned {}/{}, falling back to fan-out",
                            preferred,
                            tracks.len(),
                            limit
                        );
                        let mut merged = tracks;
                        merged.extend(self.run_candidates(op, candidates, input, limit, options).await);
                        return merged;
                    }
                }
            }
        }

        self.run_candidates(op, candidates, input, limit, options).await
    }

    async fn run_candidates(
        &self,
        op: Operation,
        candidates: Vec<(Arc<dyn MusicProvider>, Duration)>,
        input: &str,
        limit: usize,
        options: &RequestOptions,
    ) -> Vec<Track> {
        // Quota is charged here, at admission, before any future is
        // spawned. A call that later times out has already paid; a late
        // completion has nothing left to mutate.
        let mut admitted = Vec::new();
        for (provider, timeout) in candidates {
            if self.admit(provider.id()).await {
                admitted.push((provider, self.effective_timeout(timeout, options)));
            }
        }

        let calls = admitted
            .into_iter()
            .map(|(provider, timeout)| self.call_provider(op, provider, input, limit, timeout));

        join_all(calls).await.into_iter().flatten().collect()
    }

    fn effective_timeout(&self, configured: Duration, options: &RequestOptions) -> Duration {
        options
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(configured)
    }

    async fn admit(&self, id: ProviderId) -> bool {
        let cost = self.quota.search_cost(id);
        let admitted = self.quota.try_consume(id, cost).await;
        if !admitted {
            log::info!("Provider {} skipped for this request: quota exhausted", id);
        }
        admitted
    }

    /// One throttled, timeout-raced provider call. Timeouts drop the
    /// in-flight future, so nothing mutates shared state afterwards.
    async fn call_provider(
        &self,
        op: Operation,
        provider: Arc<dyn MusicProvider>,
        input: &str,
        limit: usize,
        timeout: Duration,
    ) -> Vec<Track> {
        let id = provider.id();
        self.throttle.acquire(id).await;

        let call = async {
            match op {
                Operation::Genre => provider.recommend_by_genre(input, limit).await,
                Operation::Search => provider.search(input, limit).await,
            }
        };

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(tracks)) => {
                self.throttle.on_success(id);
                log::debug!("{} returned {} tracks for '{}'", id, tracks.len(), input);
                tracks
            }
            Ok(Err(e)) => {
                self.throttle.on_error(id);
                log::warn!("Provider {} failed for '{}': {}", id, input, e);
                Vec::new()
            }
            Err(_) => {
                self.throttle.on_error(id);
                log::warn!("Provider {} timed out after {:?}", id, timeout);
                Vec::new()
            }
        }
    }

    async fn cache_read(&self, key: &str) -> Option<Vec<Track>> {
        match self.cache.get(key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(tracks) => {
                    log::debug!("Cache hit: {}", key);
                    Some(tracks)
                }
                Err(e) => {
                    log::warn!("Corrupt cache payload for '{}': {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                // Backend trouble is a miss, never a failure.
                log::warn!("Cache read failed for '{}': {}", key, e);
                None
            }
        }
    }

    async fn cache_read_stale(&self, key: &str) -> Option<Vec<Track>> {
        match self.cache.get_stale(key).await {
            Ok(Some(payload)) => serde_json::from_str(&payload).ok(),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Stale cache read failed for '{}': {}", key, e);
                None
            }
        }
    }

    async fn cache_write(&self, key: &str, tracks: &[Track], ttl: Duration) {
        let payload = match serde_json::to_string(tracks) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Failed to serialize result for caching: {}", e);
                return;
            }
        };
        if let Err(e) = self.cache.set(key, &payload, ttl).await {
            log::warn!("Cache write failed for '{}': {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::errors::ProviderError;
    use crate::quota::{MemoryQuotaStore, QuotaConfig, QuotaStore};
    use crate::throttle::ThrottleConfig;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        id: ProviderId,
        tracks: Vec<Track>,
        fail: bool,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(id: ProviderId, tracks: Vec<Track>) -> Self {
            Self {
                id,
                tracks,
                fail: false,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(id: ProviderId) -> Self {
            Self {
                id,
                tracks: Vec::new(),
                fail: true,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn slow(id: ProviderId, tracks: Vec<Track>, delay: Duration) -> Self {
            Self {
                id,
                tracks,
                fail: false,
                delay,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MusicProvider for MockProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn name(&self) -> &str {
            "Mock"
        }

        async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay > Duration::ZERO {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(ProviderError::Network("mock outage".to_string()));
            }
            Ok(self.tracks.iter().take(limit).cloned().collect())
        }
    }

    fn track(title: &str, artist: &str, source: ProviderId) -> Track {
        Track {
            id: format!("{}:{}", source, title.to_lowercase().replace(' ', "-")),
            title: title.to_string(),
            artist: artist.to_string(),
            album: String::new(),
            cover_url: Some(format!("https://covers.example/{}.jpg", title.len())),
            duration_ms: 200_000,
            source,
            youtube_id: None,
            spotify_id: None,
            language: None,
        }
    }

    fn tracks_named(names: &[&str], source: ProviderId) -> Vec<Track> {
        names.iter().map(|n| track(n, "Daft Punk", source)).collect()
    }

    async fn engine_with(
        providers: Vec<Arc<MockProvider>>,
        quota_configs: Option<HashMap<ProviderId, QuotaConfig>>,
    ) -> AggregatorEngine {
        let manager = Arc::new(ProviderManager::new());
        for provider in providers {
            manager.register(provider).await;
        }

        let store: Arc<dyn QuotaStore> = Arc::new(MemoryQuotaStore::new());
        let quota = Arc::new(match quota_configs {
            Some(configs) => QuotaManager::new(configs, store),
            None => QuotaManager::with_defaults(store),
        });

        let throttle = Arc::new(ThrottleController::new(ThrottleConfig {
            floor: Duration::from_millis(1),
            ceiling: Duration::from_millis(20),
            ..Default::default()
        }));

        AggregatorEngine::new(
            manager,
            quota,
            throttle,
            Arc::new(MemoryCache::new()),
            EngineConfig {
                preserve_order: true,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn combines_and_dedups_across_providers() {
        // 6 + 6 with 2 overlapping: 10 unique tracks expected.
        let spotify = Arc::new(MockProvider::new(
            ProviderId::Spotify,
            tracks_named(&["A", "B", "C", "D", "E", "F"], ProviderId::Spotify),
        ));
        let deezer = Arc::new(MockProvider::new(
            ProviderId::Deezer,
            tracks_named(&["E", "F", "G", "H", "I", "J"], ProviderId::Deezer),
        ));

        let engine = engine_with(vec![spotify, deezer], None).await;
        let options = RequestOptions {
            combine_results: true,
            ..Default::default()
        };
        let results = engine.search_multi_source("daft punk", 10, &options).await;

        assert_eq!(results.len(), 10);
        let mut keys: Vec<String> = results.iter().map(|t| t.identity_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 10, "no two entries may share an identity key");
        for track in &results {
            assert!(!track.title.is_empty());
            assert!(!track.artist.is_empty());
        }
    }

    #[tokio::test]
    async fn result_length_never_exceeds_limit() {
        let spotify = Arc::new(MockProvider::new(
            ProviderId::Spotify,
            tracks_named(&["A", "B", "C", "D", "E", "F", "G", "H"], ProviderId::Spotify),
        ));

        let engine = engine_with(vec![spotify], None).await;
        let results = engine
            .get_recommendations_by_genre("rock", 3, &RequestOptions::default())
            .await;

        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn second_identical_call_is_served_from_cache() {
        let spotify = Arc::new(MockProvider::new(
            ProviderId::Spotify,
            tracks_named(&["A", "B", "C", "D", "E", "F"], ProviderId::Spotify),
        ));

        let engine = engine_with(vec![spotify.clone()], None).await;
        let options = RequestOptions::default();

        let first = engine.search_multi_source("daft punk", 5, &options).await;
        let calls_after_first = spotify.call_count();
        let second = engine.search_multi_source("daft punk", 5, &options).await;

        assert_eq!(spotify.call_count(), calls_after_first);
        let ids_a: Vec<_> = first.iter().map(|t| t.id.clone()).collect();
        let ids_b: Vec<_> = second.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[tokio::test]
    async fn force_fresh_bypasses_the_cache() {
        let spotify = Arc::new(MockProvider::new(
            ProviderId::Spotify,
            tracks_named(&["A", "B", "C", "D", "E", "F"], ProviderId::Spotify),
        ));

        let engine = engine_with(vec![spotify.clone()], None).await;
        let options = RequestOptions {
            force_fresh: true,
            ..Default::default()
        };

        engine.search_multi_source("daft punk", 5, &options).await;
        let calls_after_first = spotify.call_count();
        engine.search_multi_source("daft punk", 5, &options).await;

        assert!(spotify.call_count() > calls_after_first);
    }

    #[tokio::test]
    async fn total_failure_falls_back_to_synthetic_tracks() {
        let spotify = Arc::new(MockProvider::failing(ProviderId::Spotify));
        let deezer = Arc::new(MockProvider::failing(ProviderId::Deezer));

        let engine = engine_with(vec![spotify, deezer], None).await;
        let results = engine
            .get_recommendations_by_genre("rock", 5, &RequestOptions::default())
            .await;

        assert_eq!(results.len(), 5);
        for track in &results {
            assert_eq!(track.source, ProviderId::Fallback);
            assert!(track.id.starts_with("fallback:rock:"));
            assert!(!track.title.is_empty());
            assert!(!track.artist.is_empty());
        }
    }

    #[tokio::test]
    async fn stale_cache_beats_synthetic_fallback() {
        let spotify = Arc::new(MockProvider::failing(ProviderId::Spotify));

        let manager = Arc::new(ProviderManager::new());
        manager.register(spotify).await;

        let cache = Arc::new(MemoryCache::new());
        let options = RequestOptions::default();
        let key = cache_key("genre", "rock", 5, &options.cache_facet());
        let stale_tracks = tracks_named(&["Old A", "Old B"], ProviderId::Spotify);
        cache
            .set(
                &key,
                &serde_json::to_string(&stale_tracks).unwrap(),
                Duration::from_millis(5),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(15)).await;

        let store: Arc<dyn QuotaStore> = Arc::new(MemoryQuotaStore::new());
        let engine = AggregatorEngine::new(
            manager,
            Arc::new(QuotaManager::with_defaults(store)),
            Arc::new(ThrottleController::new(ThrottleConfig {
                floor: Duration::from_millis(1),
                ..Default::default()
            })),
            cache,
            EngineConfig {
                preserve_order: true,
                ..Default::default()
            },
        );

        let results = engine
            .get_recommendations_by_genre("rock", 5, &options)
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Old A");
        assert_ne!(results[0].source, ProviderId::Fallback);
    }

    #[tokio::test]
    async fn quota_exhausted_provider_is_skipped() {
        let youtube = Arc::new(MockProvider::new(
            ProviderId::Youtube,
            tracks_named(&["Y1", "Y2", "Y3", "Y4", "Y5"], ProviderId::Youtube),
        ));
        let deezer = Arc::new(MockProvider::new(
            ProviderId::Deezer,
            tracks_named(&["D1", "D2", "D3", "D4", "D5"], ProviderId::Deezer),
        ));

        // YouTube budget too small for even one 100-unit search.
        let mut configs = HashMap::new();
        configs.insert(
            ProviderId::Youtube,
            QuotaConfig {
                daily_limit: 50,
                search_cost: 100,
            },
        );

        let engine = engine_with(vec![youtube.clone(), deezer.clone()], Some(configs)).await;
        let results = engine
            .search_multi_source("daft punk", 5, &RequestOptions::default())
            .await;

        assert_eq!(youtube.call_count(), 0);
        assert!(deezer.call_count() > 0);
        assert!(!results.is_empty());
        assert!(results.iter().all(|t| t.source == ProviderId::Deezer));
    }

    #[tokio::test]
    async fn excluded_artist_never_appears() {
        let mut mixed = tracks_named(&["A", "B", "C", "D", "E"], ProviderId::Spotify);
        mixed.push(track("Solo", "Thomas Bangalter", ProviderId::Spotify));

        let spotify = Arc::new(MockProvider::new(ProviderId::Spotify, mixed));
        let engine = engine_with(vec![spotify], None).await;

        let options = RequestOptions {
            exclude_artist: Some("daft punk".to_string()),
            ..Default::default()
        };
        let results = engine.search_multi_source("french house", 10, &options).await;

        assert!(results.iter().all(|t| t.artist != "Daft Punk"));
        assert!(results.iter().any(|t| t.artist == "Thomas Bangalter"));
    }

    #[tokio::test]
    async fn satisfied_preferred_source_short_circuits() {
        let spotify = Arc::new(MockProvider::new(
            ProviderId::Spotify,
            tracks_named(&["A", "B", "C", "D", "E", "F"], ProviderId::Spotify),
        ));
        let deezer = Arc::new(MockProvider::new(
            ProviderId::Deezer,
            tracks_named(&["G", "H", "I"], ProviderId::Deezer),
        ));

        let engine = engine_with(vec![spotify.clone(), deezer.clone()], None).await;
        let options = RequestOptions {
            preferred_source: Some(ProviderId::Spotify),
            combine_results: false,
            ..Default::default()
        };
        let results = engine.search_multi_source("daft punk", 5, &options).await;

        assert_eq!(results.len(), 5);
        assert_eq!(deezer.call_count(), 0);
        assert!(results.iter().all(|t| t.source == ProviderId::Spotify));
    }

    #[tokio::test]
    async fn slow_provider_times_out_without_sinking_the_request() {
        let slow = Arc::new(MockProvider::slow(
            ProviderId::Youtube,
            tracks_named(&["Never", "Arrives"], ProviderId::Youtube),
            Duration::from_secs(30),
        ));
        let deezer = Arc::new(MockProvider::new(
            ProviderId::Deezer,
            tracks_named(&["D1", "D2", "D3", "D4", "D5"], ProviderId::Deezer),
        ));

        let engine = engine_with(vec![slow, deezer], None).await;
        let options = RequestOptions {
            timeout_ms: Some(50),
            ..Default::default()
        };
        let results = engine.search_multi_source("daft punk", 5, &options).await;

        assert!(!results.is_empty());
        assert!(results.iter().all(|t| t.source == ProviderId::Deezer));
    }

    #[tokio::test]
    async fn thin_results_trigger_a_broadened_pass() {
        let spotify = Arc::new(MockProvider::new(
            ProviderId::Spotify,
            tracks_named(&["Only One"], ProviderId::Spotify),
        ));

        let engine = engine_with(vec![spotify.clone()], None).await;
        engine
            .search_multi_source("obscure b-side", 10, &RequestOptions::default())
            .await;

        // Original pass plus the broadened secondary query.
        assert_eq!(spotify.call_count(), 2);
    }
}
