use crate::types::Advisory;

/// Product keyword to official download page, in match order.
pub const OFFICIAL_SOURCES: &[(&str, &str)] = &[
    ("photoshop", "https://www.adobe.com/products/photoshop.html"),
    ("photoshop_crack", "https://www.adobe.com/products/photoshop.html"),
    ("office", "https://www.office.com/"),
    ("msword", "https://www.office.com/"),
    ("winrar", "https://www.rarlab.com/"),
    ("steam", "https://store.steampowered.com/"),
    ("vlc", "https://www.videolan.org/vlc/"),
    ("zoom", "https://zoom.us/"),
    ("chrome", "https://www.google.com/chrome/"),
    ("firefox", "https://www.mozilla.org/firefox/"),
    ("android", "https://play.google.com/store"),
];

pub const FALLBACK_ADVISORIES: &[(&str, &str)] = &[
    (
        "official vendor",
        "https://www.google.com/search?q=official+software+download",
    ),
    ("trusted app store", "https://www.microsoft.com/store"),
];

fn advisory(keyword: &str, url: &str) -> Advisory {
    Advisory {
        keyword: keyword.to_string(),
        url: url.to_string(),
    }
}

/// Exact keyword lookup.
pub fn official_source(keyword: &str) -> Option<&'static str> {
    OFFICIAL_SOURCES
        .iter()
        .find(|(key, _)| *key == keyword)
        .map(|(_, url)| *url)
}

pub fn suggest_advisories(filename: &str) -> Vec<Advisory> {
    let lowered = filename.to_lowercase();
    let found: Vec<Advisory> = OFFICIAL_SOURCES
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(keyword, url)| advisory(keyword, url))
        .collect();

    if !found.is_empty() {
        return found;
    }

    FALLBACK_ADVISORIES
        .iter()
        .map(|(keyword, url)| advisory(keyword, url))
        .collect()
}
