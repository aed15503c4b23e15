use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::errors::ProviderError;

const API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";
const REQUEST_TIMEOUT_SECONDS: u64 = 8;

/// Thin wrapper over the Last.fm REST API.
///
/// Every response is a JSON object that may carry an `error` field even
/// on HTTP 200, so the raw `Value` is handed to the adapter for digging.
pub struct LastfmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LastfmClient {
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

    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let mut url = format!(
            "{}?method={}&api_key={}&format=json",
            self.base_url, method, self.api_key
        );
        for (key, value) in params {
            url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
        }

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", status)));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if let Some(code) = data.get("error").and_then(|e| e.as_i64()) {
            let message = data
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown");
            return Err(ProviderError::Rejected(format!(
                "Last.fm error {}: {}",
                code, message
            )));
        }

        Ok(data)
    }

    /// `tag.gettoptracks` — the genre browse surface.
    pub async fn top_tracks_by_tag(&self, tag: &str, limit: usize) -> Result<Value, ProviderError> {
        self.call(
            "tag.gettoptracks",
            &[("tag", tag), ("limit", &limit.to_string())],
        )
        .await
    }

    /// `track.search` — free-text search.
    pub async fn search_tracks(&self, query: &str, limit: usize) -> Result<Value, ProviderError> {
        self.call(
            "track.search",
            &[("track", query), ("limit", &limit.to_string())],
        )
        .await
    }
}
