use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: VideoRef,
    pub snippet: Snippet,
}

#[derive(Debug, Deserialize)]
pub struct VideoRef {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub struct Snippet {
    pub title: String,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(rename = "defaultAudioLanguage")]
    pub default_audio_language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    pub high: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub default: Option<Thumbnail>,
}

impl Thumbnails {
    /// Best available thumbnail URL, largest first.
    pub fn best_url(&self) -> Option<String> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    pub id: String,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ContentDetails>,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
pub struct ContentDetails {
    /// ISO 8601 duration, e.g. "PT3M20S"
    pub duration: String,
}

/// Parse an ISO 8601 video duration into milliseconds.
///
/// "PT1H2M3S" -> 3_723_000. Returns 0 for shapes we do not recognize.
pub fn parse_iso8601_duration_ms(iso: &str) -> u64 {
    let Some(rest) = iso.strip_prefix("PT") else {
        return 0;
    };

    let mut total_secs: u64 = 0;
    let mut digits = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value: u64 = digits.parse().unwrap_or(0);
        digits.clear();
        match c {
            'H' => total_secs += value * 3600,
            'M' => total_secs += value * 60,
            'S' => total_secs += value,
            _ => return 0,
        }
    }

    total_secs * 1000
}
