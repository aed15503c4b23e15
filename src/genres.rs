//! Genre and query normalization.
//!
//! Maps arbitrary user-entered genre strings onto a fixed canonical
//! vocabulary. Deliberately lossy: downstream components need a non-empty,
//! queryable genre, so unrecognized input falls back to a default instead
//! of signaling "unknown".

/// Prefix users (and cache keys) may attach to mark genre-oriented input.
const GENRE_MARKER: &str = "genre:";

/// Canonical genre returned when nothing in the vocabulary matches.
pub const DEFAULT_GENRE: &str = "pop";

/// The canonical genre vocabulary. Compound names use a single hyphen.
pub const CANONICAL_GENRES: &[&str] = &[
    "pop",
    "rock",
    "hip-hop",
    "rap",
    "r-n-b",
    "electronic",
    "dance",
    "house",
    "techno",
    "metal",
    "punk",
    "indie",
    "alternative",
    "jazz",
    "blues",
    "classical",
    "country",
    "folk",
    "reggae",
    "latin",
    "soul",
    "funk",
    "ambient",
    "k-pop",
    "lo-fi",
    "soundtrack",
];

/// Lowercase, strip punctuation, collapse whitespace runs into one hyphen.
///
/// "Hip Hop!!" -> "hip-hop", "  Lo  Fi " -> "lo-fi"
fn slugify(input: &str) -> String {
    let cleaned: String = input
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' || c == '&' || c == '/' {
                ' '
            } else {
                // punctuation vanishes entirely
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Resolve arbitrary input to a canonical genre string.
///
/// Steps: strip the `genre:` marker, slugify, exact-match the vocabulary,
/// substring-match in both directions, then fall back to [`DEFAULT_GENRE`].
/// Never fails and never returns an empty string.
pub fn normalize_genre(input: &str) -> &'static str {
    let raw = input.trim();
    let raw = raw
        .strip_prefix(GENRE_MARKER)
        .or_else(|| {
            // marker may arrive in any case
            let lower = raw.to_lowercase();
            if lower.starts_with(GENRE_MARKER) {
                Some(&raw[GENRE_MARKER.len()..])
            } else {
                None
            }
        })
        .unwrap_or(raw);

    let slug = slugify(raw);
    if slug.is_empty() {
        return DEFAULT_GENRE;
    }

    // A handful of spellings the slug step cannot unify.
    let slug = match slug.as_str() {
        "rnb" | "rhythm-and-blues" => "r-n-b".to_string(),
        "hiphop" => "hip-hop".to_string(),
        "kpop" => "k-pop".to_string(),
        "lofi" => "lo-fi".to_string(),
        "edm" => "electronic".to_string(),
        other => other.to_string(),
    };

    if let Some(exact) = CANONICAL_GENRES.iter().copied().find(|g| *g == slug) {
        return exact;
    }

    // Partial match in both directions: "prog rock" -> "rock",
    // "elec" -> "electronic".
    if let Some(partial) = CANONICAL_GENRES
        .iter()
        .copied()
        .find(|g| slug.contains(g) || g.contains(slug.as_str()))
    {
        log::debug!("Genre '{}' partial-matched to '{}'", input, partial);
        return partial;
    }

    log::debug!("Genre '{}' not recognized, defaulting to '{}'", input, DEFAULT_GENRE);
    DEFAULT_GENRE
}

/// Normalize free-text search input for cache keys.
///
/// Same text cleanup as genre handling, but without vocabulary matching:
/// "  Daft   PUNK! " and "daft punk" must produce identical cache keys.
pub fn normalize_query(input: &str) -> String {
    let slug = slugify(input.trim());
    if slug.is_empty() {
        DEFAULT_GENRE.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_and_spacing_collapse() {
        assert_eq!(normalize_genre("Hip Hop!!"), "hip-hop");
        assert_eq!(normalize_genre("hip-hop"), "hip-hop");
        assert_eq!(normalize_genre("HIP   HOP"), "hip-hop");
    }

    #[test]
    fn marker_is_stripped() {
        assert_eq!(normalize_genre("genre:rock"), "rock");
        assert_eq!(normalize_genre("Genre:Rock"), "rock");
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(normalize_genre("RnB"), "r-n-b");
        assert_eq!(normalize_genre("EDM"), "electronic");
        assert_eq!(normalize_genre("lofi"), "lo-fi");
    }

    #[test]
    fn substring_match_both_directions() {
        assert_eq!(normalize_genre("progressive rock"), "rock");
        assert_eq!(normalize_genre("elec"), "electronic");
    }

    #[test]
    fn unknown_falls_back_to_default() {
        assert_eq!(normalize_genre("polka-grindcore"), DEFAULT_GENRE);
        assert_eq!(normalize_genre(""), DEFAULT_GENRE);
        assert_eq!(normalize_genre("!!!"), DEFAULT_GENRE);
    }

    #[test]
    fn query_normalization_is_stable() {
        assert_eq!(normalize_query("  Daft   PUNK! "), "daft-punk");
        assert_eq!(normalize_query("daft punk"), "daft-punk");
    }
}
