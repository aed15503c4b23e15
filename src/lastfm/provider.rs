use async_trait::async_trait;
use serde_json::Value;

use super::client::LastfmClient;
use super::models::{artist_name, best_image};
use crate::errors::ProviderError;
use crate::models::{Track, UNKNOWN_ARTIST, UNTITLED};
use crate::providers::titles::{or_placeholder, strip_title_noise};
use crate::providers::{MusicProvider, ProviderId};

pub struct LastfmProvider {
    client: LastfmClient,
}

impl LastfmProvider {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Ok(Self {
            client: LastfmClient::new(api_key)?,
        })
    }

    pub fn from_client(client: LastfmClient) -> Self {
        Self { client }
    }

    /// Convert one raw track object. Returns `None` when not even a name
    /// can be recovered.
    fn convert(item: &Value) -> Option<Track> {
        let name = item.get("name")?.as_str()?;

        let artist = item
            .get("artist")
            .and_then(artist_name)
            .unwrap_or_default();

        // Duration arrives in seconds, as a string more often than not.
        let duration_ms = item
            .get("duration")
            .map(|d| match d {
                Value::String(s) => s.parse::<u64>().unwrap_or(0),
                Value::Number(n) => n.as_u64().unwrap_or(0),
                _ => 0,
            })
            .unwrap_or(0)
            * 1000;

        let cover_url = item.get("image").and_then(best_image);

        let mbid = item
            .get("mbid")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty());
        let id = match mbid {
            Some(mbid) => format!("lastfm:{}", mbid),
            // No stable id on many entries: fall back to name+artist.
            None => format!(
                "lastfm:{}",
                urlencoding::encode(&format!("{}|{}", name, artist).to_lowercase())
            ),
        };

        Some(Track {
            id,
            title: or_placeholder(strip_title_noise(name), UNTITLED),
            artist: or_placeholder(artist, UNKNOWN_ARTIST),
            album: String::new(),
            cover_url,
            duration_ms,
            source: ProviderId::Lastfm,
            youtube_id: None,
            spotify_id: None,
            language: None,
        })
    }

    fn convert_list(items: Option<&Value>, limit: usize) -> Vec<Track> {
        items
            .and_then(|v| v.as_array())
            .map(|array| {
                array
                    .iter()
                    .filter_map(Self::convert)
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl MusicProvider for LastfmProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Lastfm
    }

    fn name(&self) -> &str {
        "Last.fm"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let data = self.client.search_tracks(query, limit).await?;
        let items = data
            .get("results")
            .and_then(|r| r.get("trackmatches"))
            .and_then(|t| t.get("track"));
        Ok(Self::convert_list(items, limit))
    }

    async fn recommend_by_genre(
        &self,
        genre: &str,
        limit: usize,
    ) -> Result<Vec<Track>, ProviderError> {
        let data = self.client.top_tracks_by_tag(genre, limit).await?;
        let items = data.get("tracks").and_then(|t| t.get("track"));
        Ok(Self::convert_list(items, limit))
    }
}
