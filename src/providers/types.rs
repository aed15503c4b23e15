use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Spotify,
    Youtube,
    Lastfm,
    Deezer,
    /// Synthetic tracks from the fallback generator; never a real upstream
    Fallback,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Spotify => write!(f, "spotify"),
            ProviderId::Youtube => write!(f, "youtube"),
            ProviderId::Lastfm => write!(f, "lastfm"),
            ProviderId::Deezer => write!(f, "deezer"),
            ProviderId::Fallback => write!(f, "fallback"),
        }
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spotify" => Ok(ProviderId::Spotify),
            "youtube" => Ok(ProviderId::Youtube),
            "lastfm" | "last.fm" => Ok(ProviderId::Lastfm),
            "deezer" => Ok(ProviderId::Deezer),
            "fallback" => Ok(ProviderId::Fallback),
            _ => Err(format!(
                "Invalid provider: '{}'. Valid: spotify, youtube, lastfm, deezer",
                s
            )),
        }
    }
}

impl ProviderId {
    /// Real upstream catalogs, in the default priority order.
    pub fn upstream() -> &'static [ProviderId] {
        &[
            ProviderId::Spotify,
            ProviderId::Deezer,
            ProviderId::Youtube,
            ProviderId::Lastfm,
        ]
    }

    pub fn is_upstream(&self) -> bool {
        !matches!(self, ProviderId::Fallback)
    }
}
