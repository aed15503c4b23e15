use serde_json::Value;

/// Hash of the grey-star image Last.fm serves when it has no real art.
/// Anything carrying it is treated as having no cover at all.
pub const PLACEHOLDER_IMAGE_HASH: &str = "2a96cbd8b46e442fc41c2b86b821562f";

/// Pick the largest usable image URL from a Last.fm `image` array.
///
/// The array is ordered small to large, each entry `{"#text": url,
/// "size": name}`; empty strings and the placeholder hash are skipped.
pub fn best_image(images: &Value) -> Option<String> {
    let array = images.as_array()?;
    array
        .iter()
        .rev()
        .filter_map(|img| img.get("#text").and_then(|u| u.as_str()))
        .find(|url| !url.is_empty() && !url.contains(PLACEHOLDER_IMAGE_HASH))
        .map(|url| url.to_string())
}

/// Artist field that may be a plain string or an object with a `name`.
pub fn artist_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(_) => value
            .get("name")
            .and_then(|n| n.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
        _ => None,
    }
}
