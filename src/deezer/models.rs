use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<DeezerTrack>,
}

#[derive(Debug, Deserialize)]
pub struct DeezerTrack {
    pub id: u64,
    pub title: String,
    /// Seconds, not milliseconds
    #[serde(default)]
    pub duration: u64,
    pub artist: Option<DeezerArtist>,
    pub album: Option<DeezerAlbum>,
}

#[derive(Debug, Deserialize)]
pub struct DeezerArtist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeezerAlbum {
    pub title: String,
    #[serde(rename = "cover_big")]
    pub cover_big: Option<String>,
    #[serde(rename = "cover_medium")]
    pub cover_medium: Option<String>,
}

impl DeezerAlbum {
    pub fn best_cover(&self) -> Option<String> {
        self.cover_big
            .clone()
            .or_else(|| self.cover_medium.clone())
    }
}
