//! Merge, deduplication, and result filtering.
//!
//! Providers disagree about everything except title and artist, so the
//! normalized `title|artist` pair is the identity. When two providers
//! return the same song the one with richer metadata wins and inherits
//! whatever the loser knew that it did not.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::Track;

/// Sentinel substrings upstreams put where real data should be.
/// Checked case-insensitively against both title and artist.
const INVALID_SENTINELS: &[&str] = &[
    "not found",
    "undefined",
    "null",
    "n/a",
    "[deleted]",
    "deleted video",
    "private video",
];

/// Cover URLs matching any of these are known placeholder/broken images.
const BROKEN_IMAGE_PATTERNS: &[&str] = &[
    // Last.fm grey star
    "2a96cbd8b46e442fc41c2b86b821562f",
    "/noimage/",
    "placeholder",
    "missing_cover",
];

/// Deduplicate by normalized identity, keeping first-seen order of keys.
///
/// On collision the entry with the higher completeness score survives and
/// absorbs the loser's metadata, so a Spotify track can pick up the
/// YouTube id of its duplicate.
pub fn dedup_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, Track> = HashMap::new();

    for track in tracks {
        let key = track.identity_key();
        match by_key.get_mut(&key) {
            None => {
                order.push(key.clone());
                by_key.insert(key, track);
            }
            Some(existing) => {
                if track.completeness() > existing.completeness() {
                    let mut winner = track;
                    winner.absorb(existing);
                    *existing = winner;
                } else {
                    existing.absorb(&track);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect()
}

/// Drop entries carrying upstream junk: sentinel titles/artists, known
/// placeholder cover art, and the caller's excluded artist.
pub fn filter_invalid(tracks: Vec<Track>, exclude_artist: Option<&str>) -> Vec<Track> {
    let exclude = exclude_artist.map(|a| a.to_lowercase());

    tracks
        .into_iter()
        .filter(|track| {
            let title = track.title.to_lowercase();
            let artist = track.artist.to_lowercase();

            if INVALID_SENTINELS
                .iter()
                .any(|s| title.contains(s) || artist.contains(s))
            {
                log::debug!("Dropping sentinel entry '{} - {}'", track.artist, track.title);
                return false;
            }

            if let Some(cover) = &track.cover_url {
                let cover = cover.to_lowercase();
                if BROKEN_IMAGE_PATTERNS.iter().any(|p| cover.contains(p)) {
                    log::debug!("Dropping broken-image entry '{}'", track.title);
                    return false;
                }
            }

            if let Some(excluded) = &exclude {
                if artist.contains(excluded.as_str()) {
                    return false;
                }
            }

            true
        })
        .collect()
}

/// Fisher–Yates presentation shuffle. A seed makes it reproducible.
pub fn shuffle_tracks(tracks: &mut [Track], seed: Option<u64>) {
    match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            tracks.shuffle(&mut rng);
        }
        None => {
            tracks.shuffle(&mut rand::rng());
        }
    }
}
