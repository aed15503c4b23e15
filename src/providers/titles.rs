//! Title cleanup shared by the provider adapters.
//!
//! Video-platform and tag-service payloads bury the actual song title in
//! upload noise ("(Official Video)", "[Lyrics]", channel suffixes). The
//! patterns here are removed in a fixed order so two adapters cleaning the
//! same upload title agree on the result.

/// Noise markers stripped from titles, checked case-insensitively and in
/// this order. Bracketed variants come before bare ones so "[Official
/// Video]" does not survive as "[]".
const NOISE_PATTERNS: &[&str] = &[
    "(official music video)",
    "[official music video]",
    "(official video)",
    "[official video]",
    "(official audio)",
    "[official audio]",
    "(official lyric video)",
    "(lyric video)",
    "[lyric video]",
    "(lyrics)",
    "[lyrics]",
    "(visualizer)",
    "[visualizer]",
    "(audio)",
    "(live)",
    "(hd)",
    "[hd]",
    "(4k)",
    "[4k]",
    "(hq)",
    "(remastered)",
    "official video",
    "official audio",
];

/// Remove upload noise from a raw title.
///
/// "Daft Punk - One More Time (Official Video) [HD]" ->
/// "Daft Punk - One More Time"
pub fn strip_title_noise(raw: &str) -> String {
    let mut result = raw.to_string();

    for pattern in NOISE_PATTERNS {
        loop {
            // ASCII lowercasing keeps byte offsets aligned with `result`
            let lower = result.to_ascii_lowercase();
            match lower.find(pattern) {
                Some(idx) => {
                    result.replace_range(idx..idx + pattern.len(), "");
                }
                None => break,
            }
        }
    }

    collapse_whitespace(&result)
}

/// Recover (artist, title) from the "Artist - Title" upload convention.
///
/// Returns `None` when the title carries no separator; splits on the first
/// " - " so "Artist - Song - Remix" keeps the remix in the title half.
pub fn split_artist_title(raw: &str) -> Option<(String, String)> {
    let (artist, title) = raw.split_once(" - ")?;
    let artist = collapse_whitespace(artist);
    let title = collapse_whitespace(title);
    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some((artist, title))
}

/// Substitute `placeholder` when a normalized field came out empty.
pub fn or_placeholder(value: String, placeholder: &str) -> String {
    let trimmed = collapse_whitespace(&value);
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_video_noise() {
        assert_eq!(
            strip_title_noise("Daft Punk - One More Time (Official Video) [HD]"),
            "Daft Punk - One More Time"
        );
        assert_eq!(
            strip_title_noise("Around the World [Lyrics]"),
            "Around the World"
        );
    }

    #[test]
    fn strips_repeated_noise() {
        assert_eq!(
            strip_title_noise("Song (Official Video) (Official Video)"),
            "Song"
        );
    }

    #[test]
    fn leaves_clean_titles_alone() {
        assert_eq!(strip_title_noise("Harder Better Faster Stronger"), "Harder Better Faster Stronger");
    }

    #[test]
    fn recovers_artist_from_dash_convention() {
        let (artist, title) = split_artist_title("Daft Punk - One More Time").unwrap();
        assert_eq!(artist, "Daft Punk");
        assert_eq!(title, "One More Time");
    }

    #[test]
    fn keeps_extra_dashes_in_title() {
        let (artist, title) = split_artist_title("Justice - Genesis - WAT Remix").unwrap();
        assert_eq!(artist, "Justice");
        assert_eq!(title, "Genesis - WAT Remix");
    }

    #[test]
    fn no_separator_means_no_split() {
        assert!(split_artist_title("Discovery").is_none());
        assert!(split_artist_title(" - ").is_none());
    }

    #[test]
    fn placeholder_fills_empty_fields() {
        assert_eq!(or_placeholder("   ".to_string(), "Unknown Artist"), "Unknown Artist");
        assert_eq!(or_placeholder("Kavinsky".to_string(), "Unknown Artist"), "Kavinsky");
    }
}
