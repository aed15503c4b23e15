use reqwest::Client;
use std::time::Duration;

use super::models::{DeezerTrack, SearchResponse};
use crate::errors::ProviderError;

const API_BASE: &str = "https://api.deezer.com";
const REQUEST_TIMEOUT_SECONDS: u64 = 8;

/// Thin wrapper over the public Deezer API. No credentials required.
pub struct DeezerClient {
    client: Client,
    base_url: String,
}

impl DeezerClient {
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
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
    ) -> Result<Vec<DeezerTrack>, ProviderError> {
        let url = format!(
            "{}/search?q={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", status)));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed.data)
    }
}
