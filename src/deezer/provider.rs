use async_trait::async_trait;

use super::client::DeezerClient;
use super::models::DeezerTrack;
use crate::errors::ProviderError;
use crate::models::{Track, UNKNOWN_ARTIST, UNTITLED};
use crate::providers::titles::{or_placeholder, strip_title_noise};
use crate::providers::{MusicProvider, ProviderId};

pub struct DeezerProvider {
    client: DeezerClient,
}

impl DeezerProvider {
    pub fn new() -> Result<Self, ProviderError> {
        Ok(Self {
            client: DeezerClient::new()?,
        })
    }

    pub fn from_client(client: DeezerClient) -> Self {
        Self { client }
    }

    fn convert(raw: DeezerTrack) -> Track {
        Track {
            id: format!("deezer:{}", raw.id),
            title: or_placeholder(strip_title_noise(&raw.title), UNTITLED),
            artist: or_placeholder(
                raw.artist.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
                UNKNOWN_ARTIST,
            ),
            album: raw.album.as_ref().map(|a| a.title.clone()).unwrap_or_default(),
            cover_url: raw.album.as_ref().and_then(|a| a.best_cover()),
            duration_ms: raw.duration * 1000,
            source: ProviderId::Deezer,
            youtube_id: None,
            spotify_id: None,
            language: None,
        }
    }
}

#[async_trait]
impl MusicProvider for DeezerProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Deezer
    }

    fn name(&self) -> &str {
        "Deezer"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let raw = self.client.search_tracks(query, limit).await?;
        Ok(raw.into_iter().map(Self::convert).collect())
    }
}
