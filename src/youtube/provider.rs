use async_trait::async_trait;
use std::collections::HashMap;

use super::client::YoutubeClient;
use super::models::{parse_iso8601_duration_ms, SearchItem};
use crate::errors::ProviderError;
use crate::models::{Track, UNKNOWN_ARTIST, UNTITLED};
use crate::providers::titles::{or_placeholder, split_artist_title, strip_title_noise};
use crate::providers::{MusicProvider, ProviderId};

pub struct YoutubeProvider {
    client: YoutubeClient,
    /// Whether to spend the extra unit on a videos.list call for
    /// durations and audio language after every search
    enrich_details: bool,
}

impl YoutubeProvider {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Ok(Self {
            client: YoutubeClient::new(api_key)?,
            enrich_details: true,
        })
    }

    pub fn from_client(client: YoutubeClient) -> Self {
        Self {
            client,
            enrich_details: true,
        }
    }

    pub fn without_detail_enrichment(mut self) -> Self {
        self.enrich_details = false;
        self
    }

    /// Upload titles carry the artist, not a structured field. Recover it
    /// from the "Artist - Title" convention, otherwise fall back to the
    /// channel name with the auto-generated " - Topic" suffix removed.
    fn convert(item: SearchItem) -> Track {
        let cleaned = strip_title_noise(&item.snippet.title);

        let (artist, title) = match split_artist_title(&cleaned) {
            Some((artist, title)) => (artist, title),
            None => {
                let channel = item
                    .snippet
                    .channel_title
                    .trim_end_matches(" - Topic")
                    .trim()
                    .to_string();
                (channel, cleaned)
            }
        };

        Track {
            id: format!("youtube:{}", item.id.video_id),
            title: or_placeholder(title, UNTITLED),
            artist: or_placeholder(artist, UNKNOWN_ARTIST),
            album: String::new(),
            cover_url: item.snippet.thumbnails.best_url(),
            duration_ms: 0,
            source: ProviderId::Youtube,
            youtube_id: Some(item.id.video_id),
            spotify_id: None,
            language: item.snippet.default_audio_language,
        }
    }

    /// Backfill durations and audio language from a batch detail lookup.
    /// Detail failures degrade silently; search results are still usable.
    async fn enrich(&self, tracks: &mut [Track]) {
        let ids: Vec<String> = tracks
            .iter()
            .filter_map(|t| t.youtube_id.clone())
            .collect();
        if ids.is_empty() {
            return;
        }

        let details = match self.client.video_details(&ids).await {
            Ok(d) => d,
            Err(e) => {
                log::debug!("YouTube detail enrichment failed: {}", e);
                return;
            }
        };

        let by_id: HashMap<String, _> = details
            .items
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();

        for track in tracks.iter_mut() {
            let Some(video_id) = track.youtube_id.as_deref() else {
                continue;
            };
            let Some(item) = by_id.get(video_id) else {
                continue;
            };
            if let Some(details) = &item.content_details {
                track.duration_ms = parse_iso8601_duration_ms(&details.duration);
            }
            if track.language.is_none() {
                track.language = item
                    .snippet
                    .as_ref()
                    .and_then(|s| s.default_audio_language.clone());
            }
        }
    }
}

#[async_trait]
impl MusicProvider for YoutubeProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Youtube
    }

    fn name(&self) -> &str {
        "YouTube"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let response = self.client.search_music(query, limit).await?;
        let mut tracks: Vec<Track> = response.items.into_iter().map(Self::convert).collect();

        if self.enrich_details {
            self.enrich(&mut tracks).await;
        }

        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::models::{Snippet, Thumbnail, Thumbnails, VideoRef};

    fn item(title: &str, channel: &str) -> SearchItem {
        SearchItem {
            id: VideoRef {
                video_id: "FGBhQbmPwH8".to_string(),
            },
            snippet: Snippet {
                title: title.to_string(),
                channel_title: channel.to_string(),
                thumbnails: Thumbnails {
                    high: Some(Thumbnail {
                        url: "https://i.ytimg.com/vi/FGBhQbmPwH8/hqdefault.jpg".to_string(),
                    }),
                    medium: None,
                    default: None,
                },
                default_audio_language: None,
            },
        }
    }

    #[test]
    fn recovers_artist_from_title_convention() {
        let track = YoutubeProvider::convert(item(
            "Daft Punk - One More Time (Official Video)",
            "SomeUploader",
        ));
        assert_eq!(track.artist, "Daft Punk");
        assert_eq!(track.title, "One More Time");
        assert_eq!(track.youtube_id.as_deref(), Some("FGBhQbmPwH8"));
        assert_eq!(track.source, ProviderId::Youtube);
    }

    #[test]
    fn falls_back_to_channel_without_topic_suffix() {
        let track = YoutubeProvider::convert(item("One More Time [Official Audio]", "Daft Punk - Topic"));
        assert_eq!(track.artist, "Daft Punk");
        assert_eq!(track.title, "One More Time");
    }

    #[test]
    fn empty_everything_gets_placeholders() {
        let track = YoutubeProvider::convert(item("(Official Video)", ""));
        assert_eq!(track.title, UNTITLED);
        assert_eq!(track.artist, UNKNOWN_ARTIST);
    }
}
