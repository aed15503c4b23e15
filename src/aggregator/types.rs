use serde::{Deserialize, Serialize};

use crate::providers::ProviderId;

/// Caller-facing knobs for one aggregation request.
///
/// Every field is defaulted so call sites only name what they change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestOptions {
    /// Bypass the cache entirely (no read, no write)
    pub force_fresh: bool,
    /// Ask one provider first; see `combine_results`
    pub preferred_source: Option<ProviderId>,
    /// With a preferred source set: false lets a satisfying preferred
    /// result short-circuit the fan-out, true always merges everyone
    pub combine_results: bool,
    /// Drop tracks whose artist contains this (case-insensitive)
    pub exclude_artist: Option<String>,
    /// Override every provider's fan-out timeout for this request
    pub timeout_ms: Option<u64>,
}

impl RequestOptions {
    /// The subset of options that changes the logical result shape, used
    /// for cache keying. Volatile knobs (`force_fresh`, `timeout_ms`)
    /// stay out so they cannot split the cache.
    pub fn cache_facet(&self) -> CacheFacet<'_> {
        CacheFacet {
            preferred_source: self.preferred_source,
            combine_results: self.combine_results,
            exclude_artist: self.exclude_artist.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CacheFacet<'a> {
    pub preferred_source: Option<ProviderId>,
    pub combine_results: bool,
    pub exclude_artist: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::cache_key;

    #[test]
    fn volatile_options_do_not_split_the_cache() {
        let plain = RequestOptions::default();
        let fresh = RequestOptions {
            force_fresh: true,
            timeout_ms: Some(1_000),
            ..Default::default()
        };

        assert_eq!(
            cache_key("search", "daft-punk", 10, &plain.cache_facet()),
            cache_key("search", "daft-punk", 10, &fresh.cache_facet())
        );
    }

    #[test]
    fn shape_options_do_split_the_cache() {
        let plain = RequestOptions::default();
        let combined = RequestOptions {
            combine_results: true,
            ..Default::default()
        };

        assert_ne!(
            cache_key("search", "daft-punk", 10, &plain.cache_facet()),
            cache_key("search", "daft-punk", 10, &combined.cache_facet())
        );
    }
}
