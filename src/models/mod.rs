use serde::{Deserialize, Serialize};

use crate::providers::ProviderId;

/// Placeholder substituted when an upstream omits the artist field.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Placeholder substituted when an upstream omits the title field.
pub const UNTITLED: &str = "Untitled";

/// The canonical track shape shared by every provider adapter.
///
/// `title` and `artist` are guaranteed non-empty once a track leaves an
/// adapter; consumers never branch on absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Provider-scoped identifier, e.g. "deezer:1209771" or "youtube:dQw4w9WgXcQ"
    pub id: String,
    pub title: String,
    /// Artist name(s), multiple artists joined with ", "
    pub artist: String,
    pub album: String,
    #[serde(rename = "cover", skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Duration in milliseconds (0 when the upstream does not report one)
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Which provider produced this track
    pub source: ProviderId,
    /// Cross-provider reference to the video index, when known
    #[serde(rename = "youtubeId", skip_serializing_if = "Option::is_none")]
    pub youtube_id: Option<String>,
    /// Cross-provider reference to the primary catalog, when known
    #[serde(rename = "spotifyId", skip_serializing_if = "Option::is_none")]
    pub spotify_id: Option<String>,
    /// Detected language/locale tag, when the upstream reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Track {
    /// Normalized `title|artist` composite key used for deduplication.
    pub fn identity_key(&self) -> String {
        format!(
            "{}|{}",
            self.title.trim().to_lowercase(),
            self.artist.trim().to_lowercase()
        )
    }

    /// How much optional metadata this entry carries.
    ///
    /// Used by the merge step to pick a winner among duplicates: the entry
    /// with the cover image, the cross-provider ids and a real duration
    /// beats the one that merely arrived first.
    pub fn completeness(&self) -> u8 {
        let mut score = 0u8;
        if self.cover_url.is_some() {
            score += 2;
        }
        if !self.album.is_empty() {
            score += 1;
        }
        if self.duration_ms > 0 {
            score += 1;
        }
        if self.youtube_id.is_some() {
            score += 1;
        }
        if self.spotify_id.is_some() {
            score += 1;
        }
        if self.language.is_some() {
            score += 1;
        }
        score
    }

    /// Copy metadata present on `other` but missing here.
    ///
    /// Called only during merge, before a track is cached or returned.
    pub fn absorb(&mut self, other: &Track) {
        if self.cover_url.is_none() {
            self.cover_url = other.cover_url.clone();
        }
        if self.album.is_empty() && !other.album.is_empty() {
            self.album = other.album.clone();
        }
        if self.duration_ms == 0 {
            self.duration_ms = other.duration_ms;
        }
        if self.youtube_id.is_none() {
            self.youtube_id = other.youtube_id.clone();
        }
        if self.spotify_id.is_none() {
            self.spotify_id = other.spotify_id.clone();
        }
        if self.language.is_none() {
            self.language = other.language.clone();
        }
    }
}
