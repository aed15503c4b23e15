use reqwest::Client;
use std::time::Duration;

use super::models::{SearchResponse, VideoListResponse};
use crate::errors::ProviderError;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const REQUEST_TIMEOUT_SECONDS: u64 = 10;
/// YouTube category id for Music.
const MUSIC_CATEGORY: &str = "10";

/// Thin wrapper over the YouTube Data API v3.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YoutubeClient {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: API_BASE.to_string(),
        })
    }

    /// Point the client at a different base URL (test servers).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// One search request. Billed 100 units by the upstream.
    pub async fn search_music(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<SearchResponse, ProviderError> {
        let url = format!(
            "{}/search?part=snippet&type=video&videoCategoryId={}&maxResults={}&q={}&key={}",
            self.base_url,
            MUSIC_CATEGORY,
            limit.min(50),
            urlencoding::encode(query),
            self.api_key
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.as_u16() == 403 {
            // Either a bad key or the daily quota ran out upstream.
            return Err(ProviderError::Rejected(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    /// Batch detail lookup for up to 50 video ids. Billed 1 unit.
    pub async fn video_details(
        &self,
        video_ids: &[String],
    ) -> Result<VideoListResponse, ProviderError> {
        let ids = video_ids
            .iter()
            .take(50)
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let url = format!(
            "{}/videos?part=contentDetails,snippet&id={}&key={}",
            self.base_url, ids, self.api_key
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.as_u16() == 403 {
            return Err(ProviderError::Rejected(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}
