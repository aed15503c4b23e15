use reqwest::Client;
use std::time::Duration;

use super::models::{RecommendationsResponse, SearchResponse, SpotifyTrack};
use crate::errors::ProviderError;

const API_BASE: &str = "https://api.spotify.com/v1";
const REQUEST_TIMEOUT_SECONDS: u64 = 8;

/// Thin wrapper over the Spotify Web API.
///
/// Holds a bearer token obtained out of band; token acquisition and
/// rotation are someone else's problem.
pub struct SpotifyClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl SpotifyClient {
    pub fn new(access_token: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            access_token,
            base_url: API_BASE.to_string(),
        })
    }

    /// Point the client at a different base URL (test servers).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SpotifyTrack>, ProviderError> {
        let url = format!(
            "{}/search?q={}&type=track&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ProviderError::Rejected(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", status)));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed.tracks.items)
    }

    pub async fn recommendations_by_genre(
        &self,
        genre: &str,
        limit: usize,
    ) -> Result<Vec<SpotifyTrack>, ProviderError> {
        let url = format!(
            "{}/recommendations?seed_genres={}&limit={}",
            self.base_url,
            urlencoding::encode(genre),
            limit
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ProviderError::Rejected(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", status)));
        }

        let parsed: RecommendationsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed.tracks)
    }
}
