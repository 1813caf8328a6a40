//! Extraction of inline `window.*` script assignments from play pages.
//!
//! The gequ-style sites inline all playback metadata as script globals, a
//! mix of one `window.appData = {...};` JSON blob and individual quoted,
//! numeric and boolean assignments. Quoted assignments override the blob;
//! numeric and boolean ones only fill gaps.

use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use regex::Regex;
use rustc_hash::FxHashMap;

static APP_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"window\.appData\s*=\s*(\{.*?\})\s*;").unwrap());
static SINGLE_QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"window\.(\w+)\s*=\s*'([^']*)'\s*;").unwrap());
static DOUBLE_QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"window\.(\w+)\s*=\s*"([^"]*)"\s*;"#).unwrap());
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"window\.(\w+)\s*=\s*(-?\d+(?:\.\d+)?)\s*;").unwrap());
static BOOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)window\.(\w+)\s*=\s*(true|false|null)\s*;").unwrap());

fn json_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Harvest `window.*` assignments into a flat string map.
///
/// Also derives `mp3_name` from title/author when the page omits it, and
/// decodes the obfuscated backup URL into `mp3_extra_url_decoded`.
pub fn extract_page_vars(html: &str) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();

    if let Some(caps) = APP_DATA_RE.captures(html) {
        if let Ok(serde_json::Value::Object(blob)) = serde_json::from_str(&caps[1]) {
            for (key, value) in &blob {
                vars.insert(key.clone(), json_to_string(value));
            }
        }
    }

    for pattern in [&SINGLE_QUOTED_RE, &DOUBLE_QUOTED_RE] {
        for caps in pattern.captures_iter(html) {
            vars.insert(caps[1].to_string(), caps[2].to_string());
        }
    }
    for caps in NUMBER_RE.captures_iter(html) {
        vars.entry(caps[1].to_string())
            .or_insert_with(|| caps[2].to_string());
    }
    for caps in BOOL_RE.captures_iter(html) {
        vars.entry(caps[1].to_string())
            .or_insert_with(|| caps[2].to_lowercase());
    }

    if !vars.contains_key("mp3_name") {
        let title = vars.get("mp3_title").filter(|v| !v.is_empty()).cloned();
        let author = vars.get("mp3_author").filter(|v| !v.is_empty()).cloned();
        if let (Some(title), Some(author)) = (title, author) {
            vars.insert("mp3_name".to_string(), format!("{title}-{author}"));
        }
    }

    let decoded = vars
        .get("mp3_extra_url")
        .map(|encoded| decode_backup_url(encoded));
    if let Some(decoded) = decoded {
        if !decoded.is_empty() {
            vars.insert("mp3_extra_url_decoded".to_string(), decoded);
        }
    }

    vars
}

/// The backup download URL is base64 with `#` substituted for `H`.
pub fn decode_backup_url(raw: &str) -> String {
    let b64 = raw.replace('#', "H");
    let trimmed = b64.trim_end_matches('=');
    match STANDARD_NO_PAD.decode(trimmed.as_bytes()) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or_default(),
        Err(_) => String::new(),
    }
}
