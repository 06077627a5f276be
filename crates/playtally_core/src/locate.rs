use url::Url;

use crate::ItemId;

const TITLE_SUFFIX: &str = " | Board Game |";

/// Extracts the item id from a catalog page location.
///
/// The id is the first all-digit path segment that is followed by another
/// segment, e.g. `https://boardgamegeek.com/boardgame/13/catan`. A bare number
/// is accepted as-is.
pub fn item_id_from_location(location: &str) -> Option<ItemId> {
    let trimmed = location.trim();
    if let Ok(id) = trimmed.parse::<ItemId>() {
        return Some(id);
    }

    let path = match Url::parse(trimmed) {
        Ok(url) => url.path().to_string(),
        Err(_) => trimmed.to_string(),
    };

    let segments: Vec<&str> = path.split('/').collect();
    // Needs a slash on both sides, so the last segment never qualifies.
    segments
        .iter()
        .enumerate()
        .skip(1)
        .take(segments.len().saturating_sub(2))
        .find(|(_, seg)| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|(_, seg)| seg.parse().ok())
}

/// Extracts the item name from a catalog page title such as
/// `Catan | Board Game | BoardGameGeek`. Falls back to the trimmed title.
pub fn display_name_from_title(title: &str) -> Option<String> {
    let name = match title.find(TITLE_SUFFIX) {
        Some(idx) => &title[..idx],
        None => title,
    };
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
