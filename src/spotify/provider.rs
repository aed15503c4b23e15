use async_trait::async_trait;

use super::client::SpotifyClient;
use super::models::SpotifyTrack;
use crate::errors::ProviderError;
use crate::models::{Track, UNKNOWN_ARTIST, UNTITLED};
use crate::providers::titles::{or_placeholder, strip_title_noise};
use crate::providers::{MusicProvider, ProviderId};

pub struct SpotifyProvider {
    client: SpotifyClient,
}

impl SpotifyProvider {
    pub fn new(access_token: String) -> Result<Self, ProviderError> {
        Ok(Self {
            client: SpotifyClient::new(access_token)?,
        })
    }

    pub fn from_client(client: SpotifyClient) -> Self {
        Self { client }
    }

    fn convert(raw: SpotifyTrack) -> Track {
        let artist = raw
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let cover_url = raw
            .album
            .as_ref()
            .and_then(|a| a.images.first())
            .map(|i| i.url.clone());

        Track {
            id: format!("spotify:{}", raw.id),
            title: or_placeholder(strip_title_noise(&raw.name), UNTITLED),
            artist: or_placeholder(artist, UNKNOWN_ARTIST),
            album: raw.album.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
            cover_url,
            duration_ms: raw.duration_ms,
            source: ProviderId::Spotify,
            youtube_id: None,
            spotify_id: Some(raw.id),
            language: None,
        }
    }
}

#[async_trait]
impl MusicProvider for SpotifyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Spotify
    }

    fn name(&self) -> &str {
        "Spotify"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let raw = self.client.search_tracks(query, limit).await?;
        Ok(raw.into_iter().map(Self::convert).collect())
    }

    async fn recommend_by_genre(
        &self,
        genre: &str,
        limit: usize,
    ) -> Result<Vec<Track>, ProviderError> {
        let raw = self.client.recommendations_by_genre(genre, limit).await?;
        Ok(raw.into_iter().map(Self::convert).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::models::{SpotifyAlbum, SpotifyArtist, SpotifyImage};

    fn raw_track() -> SpotifyTrack {
        SpotifyTrack {
            id: "4PTG3Z6ehGkBFwjybzWkR8".to_string(),
            name: "One More Time".to_string(),
            artists: vec![
                SpotifyArtist {
                    name: "Daft Punk".to_string(),
                },
                SpotifyArtist {
                    name: "Romanthony".to_string(),
                },
            ],
            album: Some(SpotifyAlbum {
                name: "Discovery".to_string(),
                images: vec![SpotifyImage {
                    url: "https://i.scdn.co/image/ab67616d".to_string(),
                    width: Some(640),
                    height: Some(640),
                }],
            }),
            duration_ms: 320_357,
        }
    }

    #[test]
    fn joins_multiple_artists() {
        let track = SpotifyProvider::convert(raw_track());
        assert_eq!(track.artist, "Daft Punk, Romanthony");
        assert_eq!(track.id, "spotify:4PTG3Z6ehGkBFwjybzWkR8");
        assert_eq!(track.spotify_id.as_deref(), Some("4PTG3Z6ehGkBFwjybzWkR8"));
        assert_eq!(track.source, ProviderId::Spotify);
    }

    #[test]
    fn missing_artist_gets_placeholder() {
        let mut raw = raw_track();
        raw.artists.clear();
        let track = SpotifyProvider::convert(raw);
        assert_eq!(track.artist, UNKNOWN_ARTIST);
    }

    #[test]
    fn missing_album_means_no_cover() {
        let mut raw = raw_track();
        raw.album = None;
        let track = SpotifyProvider::convert(raw);
        assert!(track.cover_url.is_none());
        assert!(track.album.is_empty());
    }
}
