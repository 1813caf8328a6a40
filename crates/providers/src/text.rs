//! Shared normalization for scraped titles, artists and URLs.

use url::Url;

/// Action-button captions that leak into scraped title text.
const NOISE_TOKENS: &[&str] = &["播放", "试听", "下载", "分享"];

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace runs to single spaces and strip noise tokens.
pub fn normalize_text(text: &str) -> String {
    let mut value = collapse_whitespace(text);
    for token in NOISE_TOKENS {
        value = value.replace(token, "");
    }
    collapse_whitespace(&value)
}

/// Split a combined song string into `(artist, title)`.
///
/// Delimiters are tried in order: `artist《title》`, `" - "`, then a bare
/// `-`, each reading the segment after the delimiter as the artist. With no
/// recognized delimiter the whole normalized string is the title and the
/// artist is left empty for the caller to substitute a default label.
pub fn split_title_artist(text: &str) -> (String, String) {
    let normalized = normalize_text(text);

    if let Some(open) = normalized.find('《') {
        if let Some(close) = normalized.rfind('》') {
            if close > open && normalized.ends_with('》') {
                let artist = normalized[..open].trim().to_string();
                let title = normalized[open + '《'.len_utf8()..close].trim().to_string();
                if !title.is_empty() {
                    return (artist, title);
                }
            }
        }
    }

    for delimiter in [" - ", "-"] {
        if normalized.contains(delimiter) {
            let parts: Vec<&str> = normalized
                .split(delimiter)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            if parts.len() >= 2 {
                return (parts[1].to_string(), parts[0].to_string());
            }
        }
    }

    (String::new(), normalized)
}

/// Infer a file extension from a URL, ignoring the query string.
/// Defaults to `mp3` when no extension can be derived.
pub fn extract_ext(url: &str) -> String {
    let clean = url.split('?').next().unwrap_or(url);
    match clean.rsplit_once('.') {
        Some((head, ext)) if !head.is_empty() && !ext.is_empty() && !ext.contains('/') => {
            ext.to_lowercase()
        }
        _ => "mp3".to_string(),
    }
}

/// Resolve a possibly relative URL against a base. Returns the input
/// unchanged when it cannot be joined, and an empty string for empty input.
pub fn absolutize(base: &str, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    match Url::parse(base).and_then(|parsed| parsed.join(value)) {
        Ok(joined) => joined.to_string(),
        Err(_) => value.to_string(),
    }
}

fn safe_decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Percent-decode an id that may have been encoded once or twice.
pub fn decode_lenient(value: &str) -> String {
    let once = if value.contains('%') {
        safe_decode(value)
    } else {
        value.to_string()
    };
    if once.contains('%') { safe_decode(&once) } else { once }
}
